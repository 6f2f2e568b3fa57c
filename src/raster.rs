//! Software rasterizer for captured UI frames.
//!
//! Off-screen capture tessellates a fresh UI context into textured triangle
//! meshes; this module fills them into a premultiplied RGBA8 buffer with
//! src-over blending and per-primitive scissor rects.

use std::collections::HashMap;

use egui::epaint::{ClippedPrimitive, ImageData, Primitive, Vertex};
use egui::{Color32, Pos2, Rect, TextureId, TexturesDelta};

pub type PremulRgba8 = [u8; 4];

const WHITE: PremulRgba8 = [255, 255, 255, 255];

/// Premultiplied src-over.
pub fn over(dst: PremulRgba8, src: PremulRgba8) -> PremulRgba8 {
    if src[3] == 0 && src[0] == 0 && src[1] == 0 && src[2] == 0 {
        return dst;
    }
    let inv = 255u16 - u16::from(src[3]);
    let mut out = [0u8; 4];
    for i in 0..4 {
        out[i] = src[i].saturating_add(mul_div255(u16::from(dst[i]), inv));
    }
    out
}

fn mul_div255(x: u16, y: u16) -> u8 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u8
}

/// CPU-side copy of the texture atlas of a capture context (font atlas plus
/// any user textures the callback allocated).
#[derive(Default)]
pub struct TextureStore {
    textures: HashMap<TextureId, TextureImage>,
}

struct TextureImage {
    width: usize,
    height: usize,
    pixels: Vec<PremulRgba8>,
}

impl TextureStore {
    pub fn apply(&mut self, delta: &TexturesDelta) {
        for (id, image_delta) in &delta.set {
            let (width, height, pixels) = decode_image(&image_delta.image);
            match image_delta.pos {
                None => {
                    self.textures.insert(
                        *id,
                        TextureImage {
                            width,
                            height,
                            pixels,
                        },
                    );
                }
                Some([x, y]) => {
                    if let Some(existing) = self.textures.get_mut(id) {
                        existing.blit(x, y, width, height, &pixels);
                    }
                }
            }
        }
        // Capture contexts are throwaway; the free list can be ignored.
    }

    fn sample(&self, id: TextureId, u: f32, v: f32) -> PremulRgba8 {
        let Some(tex) = self.textures.get(&id) else {
            return WHITE;
        };
        if tex.width == 0 || tex.height == 0 {
            return WHITE;
        }
        let x = ((u * tex.width as f32) as isize).clamp(0, tex.width as isize - 1) as usize;
        let y = ((v * tex.height as f32) as isize).clamp(0, tex.height as isize - 1) as usize;
        tex.pixels[y * tex.width + x]
    }
}

impl TextureImage {
    fn blit(&mut self, x: usize, y: usize, width: usize, height: usize, pixels: &[PremulRgba8]) {
        for row in 0..height {
            let dy = y + row;
            if dy >= self.height {
                break;
            }
            for col in 0..width {
                let dx = x + col;
                if dx >= self.width {
                    break;
                }
                self.pixels[dy * self.width + dx] = pixels[row * width + col];
            }
        }
    }
}

fn decode_image(image: &ImageData) -> (usize, usize, Vec<PremulRgba8>) {
    match image {
        ImageData::Color(img) => (
            img.size[0],
            img.size[1],
            img.pixels.iter().map(|c| c.to_array()).collect(),
        ),
        ImageData::Font(img) => (
            img.size[0],
            img.size[1],
            img.srgba_pixels(None).map(|c| c.to_array()).collect(),
        ),
    }
}

/// Fill tessellated primitives into `pixels` (premultiplied RGBA8, row-major,
/// `width * height * 4` bytes).
pub fn paint_primitives(
    pixels: &mut [u8],
    width: usize,
    height: usize,
    primitives: &[ClippedPrimitive],
    store: &TextureStore,
    pixels_per_point: f32,
) {
    for clipped in primitives {
        let Primitive::Mesh(mesh) = &clipped.primitive else {
            // Paint callbacks need a live GPU; nothing to do off-screen.
            continue;
        };
        let clip = scale_rect(clipped.clip_rect, pixels_per_point);
        for tri in mesh.indices.chunks_exact(3) {
            let v0 = &mesh.vertices[tri[0] as usize];
            let v1 = &mesh.vertices[tri[1] as usize];
            let v2 = &mesh.vertices[tri[2] as usize];
            fill_triangle(
                pixels,
                width,
                height,
                clip,
                [v0, v1, v2],
                mesh.texture_id,
                store,
                pixels_per_point,
            );
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn fill_triangle(
    pixels: &mut [u8],
    width: usize,
    height: usize,
    clip: Rect,
    verts: [&Vertex; 3],
    texture: TextureId,
    store: &TextureStore,
    scale: f32,
) {
    let p = [
        scale_pos(verts[0].pos, scale),
        scale_pos(verts[1].pos, scale),
        scale_pos(verts[2].pos, scale),
    ];
    let area = edge(p[0], p[1], p[2]);
    if area.abs() < 1e-6 {
        return;
    }

    let min_x = p.iter().map(|v| v.x).fold(f32::INFINITY, f32::min);
    let max_x = p.iter().map(|v| v.x).fold(f32::NEG_INFINITY, f32::max);
    let min_y = p.iter().map(|v| v.y).fold(f32::INFINITY, f32::min);
    let max_y = p.iter().map(|v| v.y).fold(f32::NEG_INFINITY, f32::max);

    let x0 = (min_x.max(clip.min.x).max(0.0)).floor() as usize;
    let x1 = (max_x.min(clip.max.x).min(width as f32)).ceil() as usize;
    let y0 = (min_y.max(clip.min.y).max(0.0)).floor() as usize;
    let y1 = (max_y.min(clip.max.y).min(height as f32)).ceil() as usize;
    if x0 >= x1 || y0 >= y1 {
        return;
    }

    for y in y0..y1.min(height) {
        for x in x0..x1.min(width) {
            let point = Pos2::new(x as f32 + 0.5, y as f32 + 0.5);
            let w0 = edge(p[1], p[2], point);
            let w1 = edge(p[2], p[0], point);
            let w2 = edge(p[0], p[1], point);

            let inside = if area > 0.0 {
                w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0
            } else {
                w0 <= 0.0 && w1 <= 0.0 && w2 <= 0.0
            };
            if !inside {
                continue;
            }

            let l0 = w0 / area;
            let l1 = w1 / area;
            let l2 = w2 / area;

            let u = l0 * verts[0].uv.x + l1 * verts[1].uv.x + l2 * verts[2].uv.x;
            let v = l0 * verts[0].uv.y + l1 * verts[1].uv.y + l2 * verts[2].uv.y;
            let tint = lerp_color([verts[0].color, verts[1].color, verts[2].color], [l0, l1, l2]);
            let tex = store.sample(texture, u, v);

            let mut src = [0u8; 4];
            for i in 0..4 {
                src[i] = mul_div255(u16::from(tint[i]), u16::from(tex[i]));
            }

            let idx = (y * width + x) * 4;
            let dst = [
                pixels[idx],
                pixels[idx + 1],
                pixels[idx + 2],
                pixels[idx + 3],
            ];
            pixels[idx..idx + 4].copy_from_slice(&over(dst, src));
        }
    }
}

fn edge(a: Pos2, b: Pos2, p: Pos2) -> f32 {
    (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)
}

fn scale_pos(p: Pos2, scale: f32) -> Pos2 {
    Pos2::new(p.x * scale, p.y * scale)
}

fn scale_rect(r: Rect, scale: f32) -> Rect {
    Rect::from_min_max(scale_pos(r.min, scale), scale_pos(r.max, scale))
}

fn lerp_color(colors: [Color32; 3], weights: [f32; 3]) -> PremulRgba8 {
    let mut out = [0u8; 4];
    for i in 0..4 {
        let v = weights[0] * f32::from(colors[0].to_array()[i])
            + weights[1] * f32::from(colors[1].to_array()[i])
            + weights[2] * f32::from(colors[2].to_array()[i]);
        out[i] = v.round().clamp(0.0, 255.0) as u8;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::epaint::Mesh;

    #[test]
    fn over_transparent_src_is_noop() {
        let dst = [10, 20, 30, 40];
        assert_eq!(over(dst, [0, 0, 0, 0]), dst);
    }

    #[test]
    fn over_opaque_src_replaces_dst() {
        let src = [200, 100, 50, 255];
        assert_eq!(over([1, 2, 3, 255], src), src);
    }

    #[test]
    fn over_accumulates_alpha() {
        let half = [0, 0, 0, 128];
        let out = over(half, half);
        assert!(out[3] > 128);
    }

    fn solid_mesh(rect: Rect, color: Color32) -> ClippedPrimitive {
        let mut mesh = Mesh::default();
        mesh.add_colored_rect(rect, color);
        ClippedPrimitive {
            clip_rect: Rect::from_min_max(Pos2::ZERO, Pos2::new(1000.0, 1000.0)),
            primitive: Primitive::Mesh(mesh),
        }
    }

    #[test]
    fn filled_rect_covers_its_pixels_and_no_others() {
        let (w, h) = (8usize, 8usize);
        let mut pixels = vec![0u8; w * h * 4];
        let prim = solid_mesh(
            Rect::from_min_max(Pos2::new(0.0, 0.0), Pos2::new(4.0, 8.0)),
            Color32::WHITE,
        );
        paint_primitives(&mut pixels, w, h, &[prim], &TextureStore::default(), 1.0);

        // Inside the rect.
        assert_eq!(pixels[(2 * w + 2) * 4 + 3], 255);
        // Outside the rect.
        assert_eq!(pixels[(2 * w + 6) * 4 + 3], 0);
    }

    #[test]
    fn clip_rect_scissors_the_fill() {
        let (w, h) = (8usize, 8usize);
        let mut pixels = vec![0u8; w * h * 4];
        let mut prim = solid_mesh(
            Rect::from_min_max(Pos2::ZERO, Pos2::new(8.0, 8.0)),
            Color32::WHITE,
        );
        prim.clip_rect = Rect::from_min_max(Pos2::ZERO, Pos2::new(4.0, 4.0));
        paint_primitives(&mut pixels, w, h, &[prim], &TextureStore::default(), 1.0);

        assert_eq!(pixels[(1 * w + 1) * 4 + 3], 255);
        assert_eq!(pixels[(6 * w + 6) * 4 + 3], 0);
    }
}
