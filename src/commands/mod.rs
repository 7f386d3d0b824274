pub mod branches;
pub mod check;
pub mod commit;
pub mod log;
pub mod remote;
pub mod revert;
pub mod stage;
pub mod status;
pub mod tree;
pub mod username;

pub use branches::*;
pub use check::*;
pub use commit::*;
pub use log::*;
pub use remote::*;
pub use revert::*;
pub use stage::*;
pub use status::*;
pub use tree::*;
pub use username::*;
