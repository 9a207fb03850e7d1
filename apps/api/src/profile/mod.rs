// Onboarding and profile management.
// A profile write always ensures the declared industry has an insight first.

pub mod handlers;
pub mod service;
