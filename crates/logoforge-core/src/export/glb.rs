//! Binary glTF (GLB) serialization
//!
//! Hand-rolled single-file GLB writer: one mesh, one material, one embedded
//! PNG texture. The JSON chunk is assembled with a string builder; the
//! binary chunk packs vertex attributes, indices, and the texture payload.

// String writing is infallible, so .expect() is safe here
// Large JSON builder function is intentionally a single unit
#![allow(clippy::expect_used)]
#![allow(clippy::too_many_lines)]

use std::path::Path;

use crate::material::{BlendMode, MaterialGraph};
use crate::mesh::Mesh;
use crate::{Error, Result};

use super::{ExportBundle, write_atomic};

/// Helper macro for writing to a String buffer.
macro_rules! write_str {
    ($dst:expr, $($arg:tt)*) => {
        write!($dst, $($arg)*).expect("String write is infallible")
    };
}

/// Helper macro for writeln to a String buffer.
macro_rules! writeln_str {
    ($dst:expr) => {
        writeln!($dst).expect("String write is infallible")
    };
    ($dst:expr, $($arg:tt)*) => {
        writeln!($dst, $($arg)*).expect("String write is infallible")
    };
}

/// Export options for GLB
#[derive(Debug, Clone)]
pub struct GlbExportOptions {
    /// Re-encode the referenced bitmap as PNG and embed it in the file
    pub embed_texture: bool,
}

impl Default for GlbExportOptions {
    fn default() -> Self {
        Self {
            embed_texture: true,
        }
    }
}

/// Serialize a bundle to a single-file GLB at `path`.
///
/// The write is atomic: bytes land in a sibling temp file that is renamed
/// onto `path` only once serialization succeeded. A mesh without UVs is
/// exported untextured rather than rejected.
pub fn export_glb(bundle: &ExportBundle, path: &Path, options: &GlbExportOptions) -> Result<()> {
    if bundle.mesh.is_empty() {
        return Err(Error::Export("mesh has no geometry to export".into()));
    }
    bundle.material.validate()?;

    // A texture is only usable when the mesh carries UVs to sample it with.
    let png = if options.embed_texture && bundle.mesh.has_uvs() {
        match bundle.material.image_bitmap() {
            Some(bitmap) => Some(encode_bitmap_png(&bitmap.path)?),
            None => None,
        }
    } else {
        None
    };

    let bytes = build_glb(&bundle.mesh, &bundle.material, png.as_deref())?;
    write_atomic(path, &bytes)
}

/// Load the rasterized bitmap and re-encode it as PNG for embedding.
fn encode_bitmap_png(path: &Path) -> Result<Vec<u8>> {
    use image::ImageEncoder;
    use image::codecs::png::PngEncoder;
    use std::io::Cursor;

    let img = image::open(path)?.to_rgba8();
    let mut bytes = Vec::new();
    let encoder = PngEncoder::new(Cursor::new(&mut bytes));
    encoder.write_image(
        img.as_raw(),
        img.width(),
        img.height(),
        image::ExtendedColorType::Rgba8,
    )?;
    Ok(bytes)
}

fn align4(len: usize) -> usize {
    (4 - (len % 4)) % 4
}

/// Assemble the complete GLB byte stream.
fn build_glb(mesh: &Mesh, material: &MaterialGraph, png: Option<&[u8]>) -> Result<Vec<u8>> {
    let positions_size = mesh.positions.len() * 12;
    let normals_size = mesh.normals.len() * 12;
    let uvs_size = mesh.uvs.len() * 8;
    let indices_size = mesh.indices.len() * 4;

    let mut bin = Vec::with_capacity(positions_size + normals_size + uvs_size + indices_size);
    for p in &mesh.positions {
        bin.extend_from_slice(bytemuck::cast_slice(&p.to_array()));
    }
    for n in &mesh.normals {
        bin.extend_from_slice(bytemuck::cast_slice(&n.to_array()));
    }
    for uv in &mesh.uvs {
        bin.extend_from_slice(bytemuck::cast_slice(&uv.to_array()));
    }
    bin.extend_from_slice(bytemuck::cast_slice(&mesh.indices));

    let png_offset = if let Some(png) = png {
        bin.resize(bin.len() + align4(bin.len()), 0);
        let offset = bin.len();
        bin.extend_from_slice(png);
        Some((offset, png.len()))
    } else {
        None
    };

    let json = build_gltf_json(mesh, material, bin.len(), png_offset);

    let json_bytes = json.into_bytes();
    let json_padding = align4(json_bytes.len());
    let bin_padding = align4(bin.len());

    let total_size = 12
        + 8 + json_bytes.len() + json_padding
        + 8 + bin.len() + bin_padding;

    let mut out = Vec::with_capacity(total_size);

    // GLB header
    out.extend_from_slice(b"glTF");
    out.extend_from_slice(&2u32.to_le_bytes());
    out.extend_from_slice(&u32::try_from(total_size).map_err(|_| {
        Error::Export("asset exceeds the 4 GiB GLB limit".into())
    })?.to_le_bytes());

    // JSON chunk
    out.extend_from_slice(&((json_bytes.len() + json_padding) as u32).to_le_bytes());
    out.extend_from_slice(&0x4E4F_534A_u32.to_le_bytes()); // "JSON"
    out.extend_from_slice(&json_bytes);
    out.resize(out.len() + json_padding, 0x20);

    // BIN chunk
    out.extend_from_slice(&((bin.len() + bin_padding) as u32).to_le_bytes());
    out.extend_from_slice(&0x004E_4942_u32.to_le_bytes()); // "BIN\0"
    out.extend_from_slice(&bin);
    out.resize(out.len() + bin_padding, 0);

    Ok(out)
}

fn build_gltf_json(
    mesh: &Mesh,
    material: &MaterialGraph,
    buffer_size: usize,
    png: Option<(usize, usize)>,
) -> String {
    use std::fmt::Write;

    let has_uvs = mesh.has_uvs();

    let positions_size = mesh.positions.len() * 12;
    let normals_size = mesh.normals.len() * 12;
    let uvs_size = mesh.uvs.len() * 8;
    let indices_size = mesh.indices.len() * 4;

    let positions_offset = 0;
    let normals_offset = positions_size;
    let uvs_offset = normals_offset + normals_size;
    let indices_offset = uvs_offset + uvs_size;

    // View/accessor numbering shifts when the UV attribute is absent.
    let indices_view = if has_uvs { 3 } else { 2 };
    let image_view = indices_view + 1;

    let (min, max) = mesh.bounds().unwrap_or_default();

    let mut json = String::new();
    writeln_str!(json, "{{");
    writeln_str!(
        json,
        r#"  "asset": {{ "version": "2.0", "generator": "logoforge" }},"#
    );
    writeln_str!(json, r#"  "scene": 0,"#);
    writeln_str!(json, r#"  "scenes": [{{ "nodes": [0] }}],"#);
    writeln_str!(json, r#"  "nodes": [{{ "mesh": 0, "name": "Logo" }}],"#);

    // Meshes
    writeln_str!(json, r#"  "meshes": [{{"#);
    writeln_str!(json, r#"    "primitives": [{{"#);
    if has_uvs {
        writeln_str!(
            json,
            r#"      "attributes": {{ "POSITION": 0, "NORMAL": 1, "TEXCOORD_0": 2 }},"#
        );
    } else {
        writeln_str!(
            json,
            r#"      "attributes": {{ "POSITION": 0, "NORMAL": 1 }},"#
        );
    }
    writeln_str!(json, r#"      "indices": {}, "material": 0"#, indices_view);
    writeln_str!(json, r#"    }}]"#);
    writeln_str!(json, r#"  }}],"#);

    // Accessors
    writeln_str!(json, r#"  "accessors": ["#);
    writeln_str!(
        json,
        r#"    {{ "bufferView": 0, "componentType": 5126, "count": {}, "type": "VEC3", "min": [{}, {}, {}], "max": [{}, {}, {}] }},"#,
        mesh.positions.len(),
        min.x,
        min.y,
        min.z,
        max.x,
        max.y,
        max.z
    );
    write_str!(
        json,
        r#"    {{ "bufferView": 1, "componentType": 5126, "count": {}, "type": "VEC3" }},"#,
        mesh.normals.len()
    );
    writeln_str!(json);
    if has_uvs {
        writeln_str!(
            json,
            r#"    {{ "bufferView": 2, "componentType": 5126, "count": {}, "type": "VEC2" }},"#,
            mesh.uvs.len()
        );
    }
    writeln_str!(
        json,
        r#"    {{ "bufferView": {}, "componentType": 5125, "count": {}, "type": "SCALAR" }}"#,
        indices_view,
        mesh.indices.len()
    );
    writeln_str!(json, r#"  ],"#);

    // Buffer views
    writeln_str!(json, r#"  "bufferViews": ["#);
    writeln_str!(
        json,
        r#"    {{ "buffer": 0, "byteOffset": {}, "byteLength": {} }},"#,
        positions_offset,
        positions_size
    );
    write_str!(
        json,
        r#"    {{ "buffer": 0, "byteOffset": {}, "byteLength": {} }},"#,
        normals_offset,
        normals_size
    );
    writeln_str!(json);
    if has_uvs {
        writeln_str!(
            json,
            r#"    {{ "buffer": 0, "byteOffset": {}, "byteLength": {} }},"#,
            uvs_offset,
            uvs_size
        );
    }
    write_str!(
        json,
        r#"    {{ "buffer": 0, "byteOffset": {}, "byteLength": {} }}"#,
        indices_offset,
        indices_size
    );
    if let Some((offset, len)) = png {
        writeln_str!(json, ",");
        write_str!(
            json,
            r#"    {{ "buffer": 0, "byteOffset": {}, "byteLength": {} }}"#,
            offset,
            len
        );
    }
    writeln_str!(json);
    writeln_str!(json, r#"  ],"#);

    // Material
    let alpha_mode = match material.blend {
        BlendMode::Opaque => "OPAQUE",
        BlendMode::Blend => "BLEND",
    };
    let base_color = material.base_color_factor();
    writeln_str!(json, r#"  "materials": [{{"#);
    writeln_str!(json, r#"    "name": {:?},"#, material.name);
    writeln_str!(json, r#"    "pbrMetallicRoughness": {{"#);
    write_str!(
        json,
        r#"      "baseColorFactor": [{}, {}, {}, {}]"#,
        base_color[0],
        base_color[1],
        base_color[2],
        base_color[3]
    );
    if png.is_some() {
        writeln_str!(json, ",");
        write_str!(json, r#"      "baseColorTexture": {{ "index": 0 }}"#);
    }
    writeln_str!(json, ",");
    writeln_str!(
        json,
        r#"      "metallicFactor": {},"#,
        material.metallic_factor()
    );
    writeln_str!(
        json,
        r#"      "roughnessFactor": {}"#,
        material.roughness_factor()
    );
    writeln_str!(json, r#"    }},"#);
    writeln_str!(json, r#"    "alphaMode": {:?}"#, alpha_mode);
    writeln_str!(json, r#"  }}],"#);

    // Textures and images
    if png.is_some() {
        writeln_str!(json, r#"  "textures": [{{ "source": 0, "sampler": 0 }}],"#);
        writeln_str!(json, r#"  "samplers": [{{"#);
        writeln_str!(json, r#"    "magFilter": 9729,"#); // LINEAR
        writeln_str!(json, r#"    "minFilter": 9987,"#); // LINEAR_MIPMAP_LINEAR
        writeln_str!(json, r#"    "wrapS": 33071,"#); // CLAMP_TO_EDGE
        writeln_str!(json, r#"    "wrapT": 33071"#); // CLAMP_TO_EDGE
        writeln_str!(json, r#"  }}],"#);
        writeln_str!(
            json,
            r#"  "images": [{{ "bufferView": {}, "mimeType": "image/png" }}],"#,
            image_view
        );
    }

    // Buffer
    writeln_str!(json, r#"  "buffers": [{{ "byteLength": {} }}]"#, buffer_size);
    writeln_str!(json, "}}");

    json
}
