use super::{Config, WhatsAppConfig};
use std::path::PathBuf;

impl Config {
    pub fn apply_env_overrides(&mut self) {
        self.apply_env_overrides_from(|key| std::env::var(key).ok());
    }

    pub(crate) fn apply_env_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(workspace) = var("LINKRELAY_WORKSPACE") {
            self.workspace_dir = PathBuf::from(workspace);
        }

        if let Some(level) = var("LINKRELAY_LOG_LEVEL") {
            self.log_level = level;
        }

        if let Some(host) = var("LINKRELAY_GATEWAY_HOST") {
            self.gateway.host = host;
        }

        if let Some(port) = var("LINKRELAY_GATEWAY_PORT").and_then(|p| p.parse::<u16>().ok())
        {
            self.gateway.port = port;
        }

        if let Some(wa) = self.whatsapp.as_mut() {
            apply_whatsapp_overrides(wa, &var);
        }
    }
}

fn apply_whatsapp_overrides<F>(wa: &mut WhatsAppConfig, var: &F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(token) = var("LINKRELAY_WHATSAPP_ACCESS_TOKEN") {
        wa.access_token = token;
    }
    if let Some(secret) = var("LINKRELAY_WHATSAPP_APP_SECRET") {
        wa.app_secret = Some(secret.trim().to_owned());
    }
}
