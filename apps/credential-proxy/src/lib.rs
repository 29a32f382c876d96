// [apps/credential-proxy/src/lib.rs]
/*!
 * =================================================================
 * APARATO: CREDENTIAL PROXY LIBRARY ROOT (V2.0 - GOLD MASTER)
 * CLASIFICACIÓN: CRATE ROOT (ESTRATO L3)
 * RESPONSABILIDAD: CUSTODIA Y ENTREGA DE CREDENCIALES DE INTEGRACIÓN
 *
 * VISION HIPER-HOLÍSTICA:
 * 1. EL AGENTE NUNCA VE EL SECRETO CRUDO: Un sandbox JWT autoriza una
 *    llamada de proxy; la credencial descifrada vive solo en el cuerpo
 *    de la respuesta saliente, jamás en un log.
 * 2. TRAZA DE ACCESO AUDITABLE: Cada préstamo de credencial deja un
 *    registro en 'access_log', independiente del éxito de la llamada
 *    upstream.
 * =================================================================
 */

pub mod access_log;
/// Verificación del sandbox JWT que autoriza un préstamo de credencial.
pub mod auth;
/// Desencriptado y entrega de credenciales de integración por `node_id`.
pub mod credentials;
pub mod errors;
pub mod handlers;
/// Adaptadores por proveedor (Slack, GitHub, PagerDuty, incident.io) para la llamada proxied.
pub mod providers;
pub mod routes;
pub mod settings;
pub mod sse;
pub mod state;

pub use errors::ProxyError;
pub use routes::build_router;
pub use settings::Settings;
pub use state::AppState;
