//! Carga de configuración del cliente desde variables de entorno.
//! Usa convención `GATEWAY_API_URL` y timeouts opcionales.

use std::env;

use dotenvy::dotenv;
use once_cell::sync::Lazy;

// Carga perezosa del archivo .env una sola vez.
static DOTENV_LOADED: Lazy<()> = Lazy::new(|| {
    let _ = dotenv(); // ignora error si no existe .env
});

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// URL base de la API (https://...), sin slash final.
    pub base_url: String,
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

impl GatewayConfig {
    pub fn from_env() -> Self {
        Lazy::force(&DOTENV_LOADED);
        let base_url = env::var("GATEWAY_API_URL").expect("GATEWAY_API_URL not set");
        let timeout_secs = env::var("GATEWAY_API_TIMEOUT_SECS").ok()
                                                               .and_then(|v| v.parse().ok())
                                                               .unwrap_or(30);
        let connect_timeout_secs = env::var("GATEWAY_API_CONNECT_TIMEOUT_SECS").ok()
                                                                               .and_then(|v| v.parse().ok())
                                                                               .unwrap_or(10);
        Self { base_url: base_url.trim_end_matches('/').to_string(),
               timeout_secs,
               connect_timeout_secs }
    }
}

/// Forzar carga temprana de .env desde aplicaciones externas si se desea.
pub fn init_dotenv() {
    Lazy::force(&DOTENV_LOADED);
}
