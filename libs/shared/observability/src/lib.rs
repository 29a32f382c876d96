// [libs/shared/observability/src/lib.rs]
/*!
 * =================================================================
 * APARATO: OBSERVABILITY BOOTSTRAP (V2.0 - GOLD MASTER)
 * CLASIFICACIÓN: SHARED UTILITY (ESTRATO L4/L6)
 * RESPONSABILIDAD: INICIALIZACIÓN DE TRAZAS Y BLINDAJE DE PÁNICOS
 *
 * VISION HIPER-HOLÍSTICA:
 * 1. UN SOLO INICIALIZADOR PARA LOS TRES BINARIOS: 'config-service',
 *    'orchestrator' y 'credential-proxy' llaman el mismo 'init_tracing'
 *    en vez de configurar su propio suscriptor.
 * 2. JSON EN PRODUCCIÓN, LEGIBLE EN DESARROLLO: El formato de salida se
 *    decide por 'cfg!(debug_assertions)', no por una variable de entorno
 *    adicional que alguien pueda olvidar fijar.
 * 3. PHOENIX SHIELD: El hook de pánico deja un registro con ubicación y
 *    payload antes de que el proceso termine.
 * =================================================================
 */

use std::panic;
use tracing::{error, info, instrument};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Initializes the global tracing subscriber for `service_name` and
/// installs a panic hook that logs the panic location and payload before
/// the default hook runs. Panics if a global subscriber is already set.
#[instrument(skip_all)]
pub fn init_tracing(service_name: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "{service_name}={level},tower_http=warn,hyper=warn,libsql=error",
            level = if cfg!(debug_assertions) { "debug" } else { "info" }
        )
        .into()
    });

    if cfg!(debug_assertions) {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact().with_target(false))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().flatten_event(true))
            .init();
    }

    let service = service_name.to_string();
    panic::set_hook(Box::new(move |panic_info| {
        let location = panic_info
            .location()
            .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
            .unwrap_or_else(|| "unknown".to_string());

        let payload = panic_info
            .payload()
            .downcast_ref::<&str>()
            .copied()
            .or_else(|| panic_info.payload().downcast_ref::<String>().map(String::as_str))
            .unwrap_or("no panic message");

        error!(target: "panic", service = %service, location = %location, "thread panicked: {payload}");
    }));

    info!("tracing initialized for {service_name}");
}
