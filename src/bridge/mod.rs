//! Method bridge
//!
//! The named-method surface of the channel: a [`MethodCall`] carries a
//! method name and a map of arguments, and [`Bridge::handle`] turns it into
//! a registry operation whose outcome is encoded as a [`Value`].
//!
//! | Method           | Arguments            | Result                    |
//! |------------------|----------------------|---------------------------|
//! | `openReadStream` | `uri`                | `Bool(true)`              |
//! | `getFileSize`    | `uri`                | `Int`                     |
//! | `readChunk`      | `uri`, `size` (opt.) | `Bytes`, `Null` at EOF    |
//! | `closeStream`    | `uri`                | `Bool(true)`              |

pub mod dispatch;
pub mod method;
pub mod value;

pub use dispatch::Bridge;
pub use method::{Method, MethodCall, ARG_SIZE, ARG_URI};
pub use value::Value;
