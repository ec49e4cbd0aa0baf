use tera::Tera;
use tracing::info;

pub const TEMPLATES_GLOB: &str = "templates/**/*";

#[derive(Debug)]
pub struct TemplateManager {
    tera: Tera,
}

impl TemplateManager {
    pub fn init() -> Result<Self, tera::Error> {
        info!(
            "{:<20} - Initializing the Template manager",
            "templ manager"
        );
        let tera = Tera::new(TEMPLATES_GLOB)?;
        Ok(Self { tera })
    }

    /// A helper function to render a template file from 'html/' directory to String
    pub fn render_html_to_string(
        &self,
        ctx: &tera::Context,
        template_file: &str,
    ) -> Result<String, tera::Error> {
        let template = format!("html/{template_file}");
        self.tera.render(&template, ctx)
    }

    pub fn tera(&self) -> &Tera {
        &self.tera
    }
}
