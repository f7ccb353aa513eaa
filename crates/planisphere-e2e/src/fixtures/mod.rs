// Test data tables
//
// Immutable records shared by every parametrized run. Setup procedures are
// plain data (`FormAction` lists) so a table row can be inspected, logged
// and reported without running it.

pub mod login;
pub mod performance;
pub mod reservation;
pub mod validation;

pub use login::{LoginCredentials, LoginOutcome, LoginTestCase, LOGIN_TEST_CASES};
pub use performance::{MAIN_PAGES, NAVIGATION_ACTIONS, NavigationAction, PageLoadTarget};
pub use reservation::{
    COMPLETION_MESSAGE, DEFAULT_RESERVATION, RESERVATION_TEST_CASES, ReservationData,
    ReservationOverrides, ReservationTestCase,
};
pub use validation::{
    EXPECTED_ERROR_MESSAGES, VALIDATION_CONSTANTS, VALIDATION_TEST_CASES, ValidationTestCase,
};
