//! # Repository Modules
//!
//! One repository per aggregate. All writes that belong to an atomic unit
//! take a `&mut SqliteConnection` from the caller's transaction; plain
//! reads use the shared pool.

pub mod booking;
pub mod car;
pub mod notification;
pub mod reward;
pub mod user;

pub use booking::BookingRepository;
pub use car::CarRepository;
pub use notification::NotificationRepository;
pub use reward::RewardRepository;
pub use user::UserRepository;
