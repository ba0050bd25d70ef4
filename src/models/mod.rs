mod company;
mod id;
mod user;

pub use company::Company;
pub use id::{CompanyId, ParseIdError, UserId};
pub use user::{Role, User, UserView};
