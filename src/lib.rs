//! storyflow
//!
//! Operaciones de negocio ("historias") compuestas por pasos que comparten
//! un contexto, con protocolo de fallos validado también entre sub-stories.
//! El motor vive en `story-core`; este crate lo expone junto con un
//! `prelude` para definir historias.
//!
//! ```ignore
//! use storyflow::prelude::*;
//!
//! let story = Story::define("Orders", "checkout").failures(["out_of_stock"])
//!                                                .step("reserve", |_| Ok(Outcome::bind("reserved", true)))
//!                                                .step("charge", |_| Ok(Outcome::success(json!({"ok": true}))))
//!                                                .build()?;
//! let result = story.run(Arguments::new().with("order_id", 7))?;
//! ```

pub use story_core::*;

use story_core::config::Settings;

pub mod prelude {
    pub use serde_json::{json, Value};
    pub use story_core::{failure_enum, Arguments, Context, FailureProtocol, Outcome, Reason, StepError, Story,
                         StoryError, Summary};
}

/// Carga `.env` y fija la configuración global antes de la primera
/// invocación.
pub fn init() -> &'static Settings {
    story_core::config::init_dotenv();
    let settings = story_core::config::settings();
    log::debug!("storyflow settings: log_bindings={}, log_history={}",
                settings.log_bindings,
                settings.log_history);
    settings
}
