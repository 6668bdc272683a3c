pub mod helpers;
pub mod test_app;

pub use helpers::{
    create_customer, customer_form, generate_test_email, get_authed, image_part, login,
    login_as_admin, post_customer,
};
pub use test_app::TestApp;
