//! Parsed shape of a module descriptor.

/// One declared path contribution. An empty path means the descriptor's
/// own directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathElement {
    pub path: String,
}

impl PathElement {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

/// The four path-element categories, in materialization order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathCategory {
    Source,
    SuperSource,
    Public,
    Stylesheet,
}

impl PathCategory {
    pub const ORDER: [Self; 4] = [
        Self::Source,
        Self::SuperSource,
        Self::Public,
        Self::Stylesheet,
    ];

    /// Descriptor element name for this category.
    pub const fn element(self) -> &'static str {
        match self {
            Self::Source => "source",
            Self::SuperSource => "super-source",
            Self::Public => "public",
            Self::Stylesheet => "stylesheet",
        }
    }

    pub fn from_element(name: &[u8]) -> Option<Self> {
        Self::ORDER
            .into_iter()
            .find(|category| category.element().as_bytes() == name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleDescriptor {
    pub name: String,
    pub inherits: Vec<String>,
    pub sources: Vec<PathElement>,
    pub super_sources: Vec<PathElement>,
    pub public_resources: Vec<PathElement>,
    pub stylesheets: Vec<PathElement>,
}

impl ModuleDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn paths(&self, category: PathCategory) -> &[PathElement] {
        match category {
            PathCategory::Source => &self.sources,
            PathCategory::SuperSource => &self.super_sources,
            PathCategory::Public => &self.public_resources,
            PathCategory::Stylesheet => &self.stylesheets,
        }
    }

    pub fn paths_mut(&mut self, category: PathCategory) -> &mut Vec<PathElement> {
        match category {
            PathCategory::Source => &mut self.sources,
            PathCategory::SuperSource => &mut self.super_sources,
            PathCategory::Public => &mut self.public_resources,
            PathCategory::Stylesheet => &mut self.stylesheets,
        }
    }

    /// Every declared path element across all categories, in [`PathCategory::ORDER`].
    pub fn path_elements(&self) -> impl Iterator<Item = (PathCategory, &PathElement)> {
        PathCategory::ORDER
            .into_iter()
            .flat_map(move |category| self.paths(category).iter().map(move |p| (category, p)))
    }

    /// Resource name of a module's descriptor: `a.b.App` -> `a/b/App.gwt.xml`.
    pub fn resource_name(module: &str, suffix: &str) -> String {
        format!("{}{suffix}", module.replace('.', "/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_elements_order() {
        let mut descriptor = ModuleDescriptor::new("a.App");
        descriptor.stylesheets.push(PathElement::new("css"));
        descriptor.public_resources.push(PathElement::new("public"));
        descriptor.super_sources.push(PathElement::new("jre"));
        descriptor.sources.push(PathElement::new("client"));
        descriptor.sources.push(PathElement::new("shared"));

        let order: Vec<_> = descriptor
            .path_elements()
            .map(|(category, p)| (category, p.path.as_str()))
            .collect();
        assert_eq!(
            order,
            vec![
                (PathCategory::Source, "client"),
                (PathCategory::Source, "shared"),
                (PathCategory::SuperSource, "jre"),
                (PathCategory::Public, "public"),
                (PathCategory::Stylesheet, "css"),
            ]
        );
    }

    #[test]
    fn test_resource_name() {
        assert_eq!(
            ModuleDescriptor::resource_name("com.example.App", ".gwt.xml"),
            "com/example/App.gwt.xml"
        );
    }

    #[test]
    fn test_from_element() {
        assert_eq!(
            PathCategory::from_element(b"super-source"),
            Some(PathCategory::SuperSource)
        );
        assert_eq!(PathCategory::from_element(b"entry-point"), None);
    }
}
