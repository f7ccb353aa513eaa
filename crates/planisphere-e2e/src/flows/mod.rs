// Multi-page flows and data-driven case runners

pub mod login;
pub mod reservation;
pub mod validation;

pub use login::run_login_case;
pub use reservation::{
    ReservationFlowOptions, ReservationFlowResult, ReservationStep, execute_reservation_flow,
};
pub use validation::{open_reservation_page, run_validation_case};
