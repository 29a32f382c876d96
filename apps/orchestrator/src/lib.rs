// [apps/orchestrator/src/lib.rs]
/*!
 * =================================================================
 * APARATO: ORCHESTRATOR LIBRARY ROOT (V4.1 - AUTORIDAD SOBERANA)
 * CLASIFICACIÓN: CRATE ROOT (ESTRATO L3)
 * RESPONSABILIDAD: DESPACHO DE AGENTES, PROVISIÓN Y FAN-OUT DE RESULTADOS
 *
 * VISION HIPER-HOLÍSTICA:
 * 1. UN SOLO PUNTO DE DESPACHO: Todo disparo de agente -- webhook,
 *    trabajo programado o invocación administrativa -- atraviesa
 *    'dispatcher::run_agent'. Ninguna ruta mintea un sandbox JWT por su
 *    cuenta.
 * 2. FAN-OUT IDEMPOTENTE: El resultado de una corrida se publica en los
 *    destinos resueltos por el árbol de configuración, nunca por un
 *    canal hardcodeado.
 * 3. MISMO ALMACÉN, NO UN MICROSERVICIO AISLADO: Habla contra el mismo
 *    store que config-service y credential-proxy en vez de tratarlo
 *    como un límite HTTP separado.
 *
 * # Mathematical Proof (Dispatch Invariance):
 * Al centralizar 'run_agent' en un único módulo, el grafo de llamadas
 * garantiza que 'max_turns', 'correlation_id' y 'output_destinations'
 * viajen juntos desde cualquier disparador hasta el resultado final.
 * =================================================================
 */

/// Mando administrativo directo sobre el despacho de un agente (`POST /api/v1/admin/agents/run`).
pub mod agents;
/// Clasificación del bearer del orquestador (token compartido o impersonación).
pub mod auth;
/// Núcleo de despacho: resuelve principal, mintea sandbox JWT y corre el agente.
pub mod dispatcher;
pub mod errors;
/// Resolución de destinos de salida y publicación del resultado de una corrida.
pub mod fanout;
pub mod feedback;
pub mod middleware;
/// Motor de aprovisionamiento de equipos nuevos (pasos a-e del contrato de onboarding).
pub mod provisioning;
pub mod routes;
/// Reclamo y ejecución de trabajos programados contra el store compartido.
pub mod scheduler;
pub mod settings;
pub mod state;
/// Adaptadores de entrada de webhooks de proveedores (Slack, GitHub, PagerDuty, incident.io, chat).
pub mod webhooks;

pub use errors::OrchestratorError;
pub use routes::build_router;
pub use scheduler::Scheduler;
pub use settings::Settings;
pub use state::AppState;
