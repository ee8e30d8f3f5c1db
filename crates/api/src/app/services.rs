//! Storage wiring shared by every route.

use std::sync::Arc;

use natours_infra::{Collection, InMemoryCollection};
use natours_tours::Tour;
use natours_users::User;

/// Collections backing the API resources.
#[derive(Clone)]
pub struct AppServices {
    pub tours: Arc<dyn Collection<Tour>>,
    pub users: Arc<dyn Collection<User>>,
}

pub fn build_services() -> AppServices {
    AppServices {
        tours: Arc::new(InMemoryCollection::<Tour>::new("natours.tours")),
        users: Arc::new(InMemoryCollection::<User>::new("natours.users")),
    }
}
