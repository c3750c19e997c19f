//! An embeddable interpreter for an ECMAScript-family scripting language,
//! with deep two-way host interop: host objects appear to scripts as live
//! reflective proxies, and script values coerce back to host types at call
//! boundaries.
//!
//! The embedder surface is [`Context`]: enter one, initialize the standard
//! objects, install host values, evaluate source.
//!
//! ```no_run
//! use cinder::Context;
//!
//! let mut context = Context::enter();
//! let scope = context.init_standard_objects();
//! let value = context
//!     .evaluate_string(&scope, "1 + 2", "inline", 1)
//!     .unwrap();
//! ```

mod context;
mod error;

pub use context::{Context, Scope, Script};
pub use error::{ScriptError, ScriptErrorKind};

pub use cinder_interp::hostbridge::{
    HostClassBuilder, HostClassId, HostDeleteHook, HostField, HostInstance, HostMethod,
    HostRegistry, HostType, HostValue, TypeWrappers, WrapFactory,
};
pub use cinder_interp::params::{ConsoleLevel, VmParams};
pub use cinder_interp::value::error::StackFrame;
pub use cinder_interp::value::object::{Handle, Object, PropertyKey, PropertyValue};
pub use cinder_interp::value::Value;
