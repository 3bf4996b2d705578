//! Entity records persisted by [`crate::SupportStore`].

mod customer;
mod tg_user;
mod ticket;

pub use customer::CustomerRecord;
pub use tg_user::TgUserRecord;
pub use ticket::TicketRecord;
