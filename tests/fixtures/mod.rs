//! Historias de prueba compartidas por los tests de integración.
//!
//! Cada familia define tres historias sobre el mismo dueño:
//! - `x`: falla con una razón del protocolo (`two`).
//! - `y`: falla con una razón fuera del protocolo (`two`).
//! - `z`: falla sin razón (`three`).
#![allow(dead_code)]

use storyflow::prelude::*;

failure_enum! {
    pub enum Errors {
        Foo => "foo",
        Bar => "bar",
        Baz => "baz",
    }
}

pub const WRONG: &str = "'foo' is too big";

pub struct Family {
    pub x: Story,
    pub y: Story,
    pub z: Story,
}

fn one(_: &Context) -> Result<Outcome, StepError> {
    Ok(Outcome::next())
}

/// Familia simple con el protocolo dado; `foo` es la razón válida que usa
/// `x`.
pub fn simple(owner: &str, protocol: FailureProtocol, foo: Reason) -> Family {
    let x = Story::define(owner, "x").failures(protocol.clone())
                                     .step("one", one)
                                     .step("two", move |_| Ok(Outcome::failure(foo.clone())))
                                     .build()
                                     .expect("x");
    let y = Story::define(owner, "y").failures(protocol.clone())
                                     .step("one", one)
                                     .step("two", |_| Ok(Outcome::failure(WRONG)))
                                     .build()
                                     .expect("y");
    let z = Story::define(owner, "z").failures(protocol)
                                     .step("one", one)
                                     .step("three", |_| Ok(Outcome::fail()))
                                     .build()
                                     .expect("z");
    Family { x, y, z }
}

/// Historias `a`, `b` y `c` que heredan `x`, `y` y `z` de `base`.
pub fn inherited(owner: &str, base: &Family) -> Family {
    let wrap = |name: &str, story: &Story| {
        Story::define(owner, name).failures(story.protocol().clone())
                                  .inherit(story)
                                  .expect("inherit")
                                  .build()
                                  .expect(name)
    };
    Family { x: wrap("a", &base.x),
             y: wrap("b", &base.y),
             z: wrap("c", &base.z) }
}

/// Historias `a`, `b` y `c` que reciben `x`, `y` y `z` de `base` inyectadas.
pub fn injected(owner: &str, base: &Family) -> Family {
    let wrap = |name: &str, story: &Story| {
        Story::define(owner, name).failures(story.protocol().clone())
                                  .substory(story)
                                  .build()
                                  .expect(name)
    };
    Family { x: wrap("a", &base.x),
             y: wrap("b", &base.y),
             z: wrap("c", &base.z) }
}

pub fn list_protocol() -> FailureProtocol {
    FailureProtocol::from(["foo", "bar", "baz"])
}

pub fn with_list() -> Family {
    simple("SimpleWithList", list_protocol(), "foo".into())
}

pub fn with_enum() -> Family {
    simple("SimpleWithEnum", Errors::protocol(), Errors::Foo.into())
}

pub fn without_protocol() -> Family {
    simple("ReasonWithSimple", FailureProtocol::absent(), "foo".into())
}
