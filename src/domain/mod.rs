pub mod user;
pub mod faq;
pub mod announcement;

pub use user::*;
pub use faq::*;
pub use announcement::*;
