use anyhow::Result;

use super::super::Container;

pub struct ModelsController<'a> {
    container: &'a Container,
}

impl<'a> ModelsController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    pub async fn list(&self) -> Result<String> {
        let models = self.container.settings_resolver().selectable_models()?;
        Ok(self.format_models(&models))
    }

    fn format_models(&self, models: &[String]) -> String {
        let mut output = "Selectable models (main_chat):\n\n".to_string();
        for model in models {
            output.push_str(&format!("  {}\n", model));
        }
        output.push_str(&format!(
            "\nProvider: {}",
            if self.container.provider_ready() {
                "ready"
            } else {
                "not configured"
            }
        ));
        output
    }
}
