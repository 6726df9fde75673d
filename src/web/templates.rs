use minijinja::Environment;
use serde::Serialize;

use crate::error::AppError;

pub fn init_templates() -> Result<Environment<'static>, minijinja::Error> {
    let mut env = Environment::new();

    // Register built-in templates
    env.add_template("home.html", include_str!("../../templates/home.html"))?;

    Ok(env)
}

/// Renders `template_name`; a missing template or a render failure is an
/// internal error, logged by [`AppError`]'s response conversion.
pub fn render_template<S: Serialize>(
    env: &Environment,
    template_name: &str,
    context: S,
) -> Result<String, AppError> {
    let template = env.get_template(template_name)?;
    template.render(context).map_err(|e| {
        AppError::internal(format!("Unable to render {}: {}", template_name, e))
    })
}
