// [libs/infra/agent-client/src/lib.rs]
/*!
 * =================================================================
 * APARATO: AGENT RUNTIME CLIENT (V3.1 - SOBERANO)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L4)
 * RESPONSABILIDAD: TÚNEL DE MANDO HACIA EL RUNTIME DE EJECUCIÓN DE AGENTES
 *
 * VISION HIPER-HOLÍSTICA:
 * 1. STREAMING, NO POLLING: Los eventos del agente se drenan por
 *    callback a medida que llegan, nunca por un bucle de encuesta.
 * 2. SANDBOX JWT COMO ÚNICA CREDENCIAL: El cliente jamás recibe ni
 *    reenvía el token de equipo del llamante original.
 * =================================================================
 */

/// Cliente HTTP/streaming contra el runtime de agentes, autenticado por sandbox JWT.
pub mod client;
pub mod errors;
/// Forma de los eventos emitidos durante una corrida de agente.
pub mod events;
/// Enrutamiento del sandbox hacia el credential-proxy correcto por integración.
pub mod sandbox_router;

pub use client::{AgentRunOutcome, AgentRuntimeClient};
pub use errors::AgentClientError;
pub use events::{AgentEvent, AgentEventType};
pub use sandbox_router::SandboxRouterClient;
