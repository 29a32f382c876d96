// [libs/domain/models/src/lib.rs]
/*!
 * =================================================================
 * APARATO: DOMAIN MODELS MASTER HUB (V5.0 - GOLD MASTER)
 * CLASIFICACIÓN: DOMAIN LOGIC (ESTRATO L2)
 * RESPONSABILIDAD: VOCABULARIO COMPARTIDO ENTRE LOS TRES SERVICIOS
 *
 * VISION HIPER-HOLÍSTICA:
 * 1. CERO E/S: Ningún tipo de este aparato toca una base de datos o la
 *    red; es puro vocabulario de dominio, de modo que 'config-service',
 *    'orchestrator' y 'credential-proxy' nunca divergen en la forma de
 *    un 'Node' o un 'Principal'.
 * 2. PRECEDENCIA DE DESTINO EXPLÍCITA: 'resolve_destinations' es la
 *    única autoridad para decidir dónde aterriza el resultado de una
 *    corrida, y un 'explicit_override' gana sobre cualquier regla de
 *    configuración.
 * 3. NOMINAL PURITY: Cero abreviaciones en la superficie pública.
 * =================================================================
 */

pub mod audit;
/// Resolución de destinos de salida con precedencia de override explícito.
pub mod destination;
pub mod error;
pub mod integration;
/// Árbol de tenencia (org / sub-team / team) y fusión de configuración efectiva.
pub mod node;
/// Identidad clasificada de un bearer y el catálogo de permisos que puede portar.
pub mod principal;
pub mod routing;
/// Registros de corrida de agente, trabajo programado y aprovisionamiento.
pub mod run;
pub mod token;

pub use audit::{AuditEvent, FeedbackSignal};
pub use destination::{resolve_destinations, Destination, OutputConfig, TriggerOverride, TriggerSource};
pub use error::DomainError;
pub use integration::{IntegrationInstance, IntegrationKind, IntegrationSchema};
pub use node::{EffectiveConfig, Node, NodeConfig, NodeKind};
pub use principal::{AuthKind, Permission, Principal};
pub use routing::RoutingMap;
pub use run::{A2ATask, AgentRun, AgentRunStatus, ProvisioningRun, ProvisioningStatus, ScheduledJob, ScheduledJobStatus};
pub use token::{ImpersonationJti, OpaqueToken, OrgAdminToken, TeamToken};
