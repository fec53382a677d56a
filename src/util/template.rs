use std::path::Path;
use std::sync::Arc;

use blogly_web::plug::{Conn, Plug};
use handlebars::Handlebars;
use walkdir::WalkDir;

use crate::error::{Error, Result};

/// The extension registry type of the templating engine
pub type TemplateEngine = Arc<Handlebars<'static>>;

pub struct TemplateMiddleware {
    engine: TemplateEngine,
}

impl TemplateMiddleware {
    /// Registers every `.hbs` file beneath `root`.
    ///
    /// In dev mode handlebars re-reads each template from disk when it is
    /// rendered, so edits show up without a restart.
    pub fn new(root: &Path, dev_mode: bool) -> Result<Self> {
        let mut handlebars = Handlebars::new();
        handlebars.set_dev_mode(dev_mode);

        for entry in WalkDir::new(root) {
            let entry = entry.map_err(|err| Error::Config(format!("error reading template dir: {}", err)))?;

            // skip directories and entries that aren't .hbs files
            let is_template = entry.file_type().is_file()
                && entry.path().extension().map_or(false, |ext| ext == "hbs");

            if !is_template { continue }

            let name = template_name(root, entry.path())
                .ok_or_else(|| Error::Config(format!("bad template path: {:?}", entry.path())))?;

            debug!("found template: {} @ {}", name, entry.path().display());
            handlebars.register_template_file(&name, entry.path())?;
        }

        info!("registered {} templates from {}", handlebars.get_templates().len(), root.display());
        Ok(TemplateMiddleware { engine: Arc::new(handlebars) })
    }

    pub fn engine(&self) -> TemplateEngine { self.engine.clone() }
}

/// The path relative to the template root, less its extension, with `/`
/// separators, e.g: `users/index`
fn template_name(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?.with_extension("");
    let parts = relative.iter()
        .map(|part| part.to_str())
        .collect::<Option<Vec<_>>>()?;

    Some(parts.join("/"))
}

impl Plug for TemplateMiddleware {
    fn call(&self, conn: &mut Conn) {
        conn.req_mut().mut_extensions().insert::<TemplateEngine>(self.engine.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_template_name() {
        let root = Path::new("./priv/templates");
        let name = template_name(root, &root.join("users").join("index.hbs"));
        assert_eq!(name.as_deref(), Some("users/index"));
    }

    #[test]
    fn test_registers_nested_templates() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("layouts")).unwrap();
        fs::write(dir.path().join("layouts").join("main.hbs"), "<main>{{{inner}}}</main>").unwrap();
        fs::write(dir.path().join("notes.txt"), "not a template").unwrap();

        let templates = TemplateMiddleware::new(dir.path(), false).unwrap();
        let engine = templates.engine();

        assert!(engine.has_template("layouts/main"));
        assert!(!engine.has_template("notes"));
    }

    #[test]
    fn test_bad_template_is_an_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("broken.hbs"), "{{#if}}").unwrap();

        assert!(TemplateMiddleware::new(dir.path(), false).is_err());
    }
}
