pub mod authors;
pub mod books;
pub mod users;

use bookapi_kernel::ModuleRegistry;

/// Register all application modules. Order matters: migrations run in
/// registration order and `book` references `author`.
pub fn register_all(registry: &mut ModuleRegistry) {
    registry.register(authors::create_module());
    registry.register(books::create_module());
    registry.register(users::create_module());
}
