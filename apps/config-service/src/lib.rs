// [apps/config-service/src/lib.rs]
/*!
 * =================================================================
 * APARATO: CONFIG SERVICE LIBRARY ROOT (V3.0 - SOBERANO)
 * CLASIFICACIÓN: CRATE ROOT (ESTRATO L3)
 * RESPONSABILIDAD: AUTORIDAD ÚNICA DE TENENCIA, TOKENS Y CLASIFICACIÓN DE PRINCIPAL
 *
 * VISION HIPER-HOLÍSTICA:
 * 1. GROUND TRUTH DE IDENTIDAD: Todo bearer que llega al enjambre pasa
 *    por 'auth::classify_jwt' u 'opaque' antes de tocar un handler.
 *    Ningún otro servicio decide quién es el llamante por su cuenta.
 * 2. HERENCIA DE CONFIGURACIÓN: El árbol org -> sub-team -> team resuelve
 *    su config efectiva por fusión de ancestros, nunca por copia.
 * 3. HYGIENE: Sin abreviaciones en la superficie pública.
 * =================================================================
 */

/// Clasificación de bearers (compartido, opaco, OIDC, impersonación) en un [`Principal`](incidentfox_domain::Principal).
pub mod auth;
/// Catálogo de fallos HTTP del servicio y su traducción a `IntoResponse`.
pub mod errors;
/// Adaptadores de entrada: auth/config propio, administración y rutas internas.
pub mod handlers;
/// Guardián perimetral que clasifica el bearer antes de exponer la request al handler.
pub mod middleware;
/// Verificación JWKS/RS256 de tokens OIDC emitidos por el proveedor de identidad del operador.
pub mod oidc;
/// Topología de rutas HTTP autenticadas e internas.
pub mod routes;
pub mod settings;
pub mod state;

pub use errors::ApiError;
pub use settings::Settings;
pub use state::AppState;
