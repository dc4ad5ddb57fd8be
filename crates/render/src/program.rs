use seascape_common::ShaderHandle;

/// Named binding lookup on a shader program.
///
/// Lookups return `None` when the program has no such binding; callers skip
/// the binding instead of failing.
pub trait ShaderProgram {
    fn name(&self) -> &str;
    fn uniform_location(&self, name: &str) -> Option<u32>;
    fn attribute_location(&self, name: &str) -> Option<u32>;
}

/// Static binding table of a built-in program. A binding's location is its
/// index in the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramLayout {
    pub name: &'static str,
    pub uniforms: &'static [&'static str],
    pub attributes: &'static [&'static str],
}

impl ProgramLayout {
    pub const COLORED: Self = Self {
        name: "colored",
        uniforms: &["P", "V", "M"],
        attributes: &["vertex", "color"],
    };

    pub const LAMBERT: Self = Self {
        name: "lambert",
        uniforms: &["P", "V", "M", "color"],
        attributes: &["vertex", "normal"],
    };

    pub const LAMBERT_TEXTURED: Self = Self {
        name: "lambert_textured",
        uniforms: &["P", "V", "M", "lightPosition", "tex", "rough"],
        attributes: &["vertex", "normal", "texCoord"],
    };

    pub const WATER: Self = Self {
        name: "water",
        uniforms: &["P", "V", "M", "tex"],
        attributes: &["vertex", "colors", "normals", "offset", "texCoord"],
    };

    /// Layout of a built-in program.
    pub fn for_handle(handle: ShaderHandle) -> Option<&'static Self> {
        match handle {
            ShaderHandle::COLORED => Some(&Self::COLORED),
            ShaderHandle::LAMBERT => Some(&Self::LAMBERT),
            ShaderHandle::LAMBERT_TEXTURED => Some(&Self::LAMBERT_TEXTURED),
            ShaderHandle::WATER => Some(&Self::WATER),
            _ => None,
        }
    }
}

fn position(table: &[&str], name: &str) -> Option<u32> {
    table.iter().position(|n| *n == name).map(|i| i as u32)
}

impl ShaderProgram for ProgramLayout {
    fn name(&self) -> &str {
        self.name
    }

    fn uniform_location(&self, name: &str) -> Option<u32> {
        position(self.uniforms, name)
    }

    fn attribute_location(&self, name: &str) -> Option<u32> {
        position(self.attributes, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn water_program_has_surface_attributes() {
        let water = ProgramLayout::WATER;
        assert_eq!(water.attribute_location("vertex"), Some(0));
        assert_eq!(water.attribute_location("offset"), Some(3));
        assert_eq!(water.uniform_location("M"), Some(2));
    }

    #[test]
    fn missing_binding_is_none() {
        assert_eq!(ProgramLayout::LAMBERT.attribute_location("offset"), None);
        assert_eq!(ProgramLayout::COLORED.uniform_location("tex"), None);
    }

    #[test]
    fn handles_map_to_layouts() {
        assert_eq!(
            ProgramLayout::for_handle(ShaderHandle::WATER).map(|l| l.name),
            Some("water")
        );
        assert!(ProgramLayout::for_handle(ShaderHandle(99)).is_none());
    }
}
