//! Material graph construction
//!
//! Builds the minimal shading graph for a logo asset: one image sampler
//! feeding base color and alpha into an opaque physically-based surface.
//! Surface definitions are resolved by name through a [`SurfaceRegistry`],
//! standing in for the host shading system.

use std::collections::HashMap;

use crate::texture::{AlphaMode, TextureBitmap};
use crate::{Error, Result};

/// Name of the physically-based surface definition every registry carries.
pub const PRINCIPLED_SURFACE: &str = "principled";

/// Display name given to the bound material.
const MATERIAL_NAME: &str = "Logo Material";

/// Material blend mode. Logo assets are always rendered opaque.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendMode {
    Opaque,
    Blend,
}

/// Output channel of an image texture node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputSocket {
    Color,
    Alpha,
}

/// Input socket of a surface node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputSocket {
    BaseColor,
    Alpha,
    Roughness,
    Metallic,
}

/// Handle to a node inside one [`MaterialGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeId(usize);

/// A shading node.
#[derive(Debug, Clone)]
pub enum ShadingNode {
    /// Samples an external bitmap; outputs color and alpha.
    ImageTexture { bitmap: TextureBitmap },
    /// Physically-based surface with constant fallback factors.
    Surface {
        definition: String,
        base_color: [f32; 4],
        roughness: f32,
        metallic: f32,
    },
}

/// A directed connection between two node sockets.
#[derive(Debug, Clone, Copy)]
pub struct ShadingLink {
    pub from: (NodeId, OutputSocket),
    pub to: (NodeId, InputSocket),
}

/// Small DAG of shading nodes describing one material.
#[derive(Debug, Clone)]
pub struct MaterialGraph {
    pub name: String,
    pub blend: BlendMode,
    nodes: Vec<ShadingNode>,
    links: Vec<ShadingLink>,
    surface: NodeId,
}

impl MaterialGraph {
    pub fn nodes(&self) -> &[ShadingNode] {
        &self.nodes
    }

    pub fn links(&self) -> &[ShadingLink] {
        &self.links
    }

    /// Whether the surface node has an incoming link on `input`.
    pub fn surface_input_linked(&self, input: InputSocket) -> bool {
        self.links
            .iter()
            .any(|link| link.to.0 == self.surface && link.to.1 == input)
    }

    /// The bitmap sampled by the graph's image texture node, if any.
    pub fn image_bitmap(&self) -> Option<&TextureBitmap> {
        self.nodes.iter().find_map(|node| match node {
            ShadingNode::ImageTexture { bitmap } => Some(bitmap),
            ShadingNode::Surface { .. } => None,
        })
    }

    pub fn base_color_factor(&self) -> [f32; 4] {
        match &self.nodes[self.surface.0] {
            ShadingNode::Surface { base_color, .. } => *base_color,
            ShadingNode::ImageTexture { .. } => [1.0, 1.0, 1.0, 1.0],
        }
    }

    pub fn roughness_factor(&self) -> f32 {
        match &self.nodes[self.surface.0] {
            ShadingNode::Surface { roughness, .. } => *roughness,
            ShadingNode::ImageTexture { .. } => 1.0,
        }
    }

    pub fn metallic_factor(&self) -> f32 {
        match &self.nodes[self.surface.0] {
            ShadingNode::Surface { metallic, .. } => *metallic,
            ShadingNode::ImageTexture { .. } => 0.0,
        }
    }

    /// Check the graph's structural invariants.
    ///
    /// An opaque material must drive the surface's alpha input; leaving it
    /// unconnected produces undefined transparency downstream.
    pub fn validate(&self) -> Result<()> {
        if self.blend == BlendMode::Opaque && !self.surface_input_linked(InputSocket::Alpha) {
            return Err(Error::Export(
                "opaque material leaves the surface alpha input unconnected".into(),
            ));
        }
        Ok(())
    }
}

/// A surface definition the host shading system knows by name.
#[derive(Debug, Clone)]
pub struct SurfaceDefinition {
    pub name: String,
    pub inputs: Vec<InputSocket>,
}

/// Named surface definitions resolvable at bind time.
#[derive(Debug, Clone)]
pub struct SurfaceRegistry {
    definitions: HashMap<String, SurfaceDefinition>,
}

impl Default for SurfaceRegistry {
    /// Registry with the built-in principled surface available.
    fn default() -> Self {
        let mut registry = Self {
            definitions: HashMap::new(),
        };
        registry.register(SurfaceDefinition {
            name: PRINCIPLED_SURFACE.to_string(),
            inputs: vec![
                InputSocket::BaseColor,
                InputSocket::Alpha,
                InputSocket::Roughness,
                InputSocket::Metallic,
            ],
        });
        registry
    }
}

impl SurfaceRegistry {
    /// A registry with nothing registered, for environments without a
    /// usable shading system.
    pub fn empty() -> Self {
        Self {
            definitions: HashMap::new(),
        }
    }

    pub fn register(&mut self, definition: SurfaceDefinition) {
        self.definitions.insert(definition.name.clone(), definition);
    }

    pub fn resolve(&self, name: &str) -> Option<&SurfaceDefinition> {
        self.definitions.get(name)
    }
}

/// Bind a rasterized bitmap to a fresh opaque material graph.
///
/// Wires the sampler's color into base color and its alpha into the
/// surface alpha, forces the blend mode to opaque, and sets the bitmap's
/// alpha policy to [`AlphaMode::None`] so source alpha never affects
/// blending. Fails with [`Error::ShadingNodeNotFound`] when the principled
/// surface definition is missing from the registry.
pub fn bind(mut bitmap: TextureBitmap, registry: &SurfaceRegistry) -> Result<MaterialGraph> {
    let definition = registry
        .resolve(PRINCIPLED_SURFACE)
        .ok_or_else(|| Error::ShadingNodeNotFound(PRINCIPLED_SURFACE.to_string()))?;
    for required in [InputSocket::BaseColor, InputSocket::Alpha] {
        if !definition.inputs.contains(&required) {
            return Err(Error::ShadingNodeNotFound(format!(
                "{} (missing {required:?} input)",
                definition.name
            )));
        }
    }

    bitmap.alpha = AlphaMode::None;

    let image = NodeId(0);
    let surface = NodeId(1);
    let nodes = vec![
        ShadingNode::ImageTexture { bitmap },
        ShadingNode::Surface {
            definition: definition.name.clone(),
            base_color: [1.0, 1.0, 1.0, 1.0],
            roughness: 0.5,
            metallic: 0.0,
        },
    ];
    let links = vec![
        ShadingLink {
            from: (image, OutputSocket::Color),
            to: (surface, InputSocket::BaseColor),
        },
        ShadingLink {
            from: (image, OutputSocket::Alpha),
            to: (surface, InputSocket::Alpha),
        },
    ];

    let graph = MaterialGraph {
        name: MATERIAL_NAME.to_string(),
        blend: BlendMode::Opaque,
        nodes,
        links,
        surface,
    };
    graph.validate()?;
    Ok(graph)
}
