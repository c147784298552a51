mod balance;
mod expense;
mod group;
mod money;
mod split;
mod user;
mod validation;

pub use balance::*;
pub use expense::*;
pub use group::*;
pub use money::*;
pub use split::*;
pub use user::*;
pub use validation::*;
