pub mod alert;
pub mod contact;
pub mod enums;
pub mod link;
pub mod medication;
pub mod notification;
pub mod pefr;
pub mod reminder;
pub mod symptom;
pub mod user;

pub use alert::*;
pub use contact::*;
pub use enums::*;
pub use link::*;
pub use medication::*;
pub use notification::*;
pub use pefr::*;
pub use reminder::*;
pub use symptom::*;
pub use user::*;
