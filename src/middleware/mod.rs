/// Middleware do router
///
/// - Captura de panics com resposta JSON 500

pub mod panic_handler;

pub use panic_handler::panic_response;
