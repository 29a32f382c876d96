// [libs/infra/db/src/lib.rs]
/*!
 * =================================================================
 * APARATO: DB INFRASTRUCTURE ADAPTER (V6.0 - SOBERANO)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L4)
 * RESPONSABILIDAD: ÚNICO PUNTO DE ACCESO AL STORE COMPARTIDO
 *
 * VISION HIPER-HOLÍSTICA:
 * 1. UN SOLO CLIENTE, MUCHOS REPOSITORIOS: 'client::DbClient' abre la
 *    conexión; cada repositorio bajo 'repositories' habla un solo
 *    agregado (nodo, token, corrida, ruteo) y nunca SQL ajeno al suyo.
 * 2. CONFLICTOS COMO VALORES: 'errors::DbError' modela el conflicto de
 *    ruteo y el de aprovisionamiento como variantes propias en vez de
 *    dejar que escapen como errores SQL crudos.
 * =================================================================
 */

pub mod client;
pub mod errors;
/// Un módulo por agregado: nodo, token, corrida, ruteo, aprovisionamiento, webhook visto.
pub mod repositories;
pub mod schema;

pub use client::DbClient;
pub use errors::DbError;
pub use repositories::{
    AuditRepository, IntegrationRepository, NodeRepository, ProvisioningRepository, RoutingRepository, RunRepository,
    SchedulerRepository, TokenRepository, WebhookEventRepository,
};
