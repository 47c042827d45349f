mod backend;
mod message;
mod persona;
mod prompt;
mod retry;
mod role;
mod session;

pub use backend::*;
pub use message::*;
pub use persona::*;
pub use prompt::*;
pub use retry::*;
pub use role::*;
pub use session::*;
