pub mod clock;
pub mod dispatch;
pub mod projector;
pub mod retry;
pub mod scheduler;
pub mod series;
pub mod slot;
pub mod trigger;
pub mod window;
