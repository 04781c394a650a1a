pub mod state;
pub mod transition;

pub use state::PaymentState;
pub use transition::PageTransition;
