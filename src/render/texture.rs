use super::helpers::create_color_texture_device;
use crate::constants::{MAX_TEXTURE_EDGE, PLACEHOLDER_RGBA};
use crate::core::fit_within;
use crate::dom;
use wasm_bindgen_futures::JsFuture;
use web_sys as web;

/// Tightly packed RGBA8 pixels ready for upload.
pub struct ImagePixels {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl ImagePixels {
    pub fn placeholder() -> Self {
        Self {
            width: 1,
            height: 1,
            data: PLACEHOLDER_RGBA.to_vec(),
        }
    }
}

/// Fetch and decode an image, then rasterize it into RGBA pixels.
pub async fn load_pixels(src: &str) -> anyhow::Result<ImagePixels> {
    let img = web::HtmlImageElement::new().map_err(|e| anyhow::anyhow!("{:?}", e))?;
    img.set_cross_origin(Some("anonymous"));
    img.set_src(src);
    JsFuture::from(img.decode())
        .await
        .map_err(|e| anyhow::anyhow!("decode {} failed: {:?}", src, e))?;
    rasterize(&img)
}

fn rasterize(img: &web::HtmlImageElement) -> anyhow::Result<ImagePixels> {
    let (w0, h0) = (img.natural_width(), img.natural_height());
    if w0 == 0 || h0 == 0 {
        anyhow::bail!("image has no pixels");
    }
    let (width, height) = fit_within(w0, h0, MAX_TEXTURE_EDGE);
    let document = dom::window_document().ok_or_else(|| anyhow::anyhow!("no document"))?;
    let canvas = dom::create_canvas(&document).ok_or_else(|| anyhow::anyhow!("no canvas"))?;
    canvas.set_width(width);
    canvas.set_height(height);
    let ctx = dom::context_2d(&canvas).ok_or_else(|| anyhow::anyhow!("no 2d context"))?;
    ctx.draw_image_with_html_image_element_and_dw_and_dh(
        img,
        0.0,
        0.0,
        width as f64,
        height as f64,
    )
    .map_err(|e| anyhow::anyhow!("{:?}", e))?;
    let data = ctx
        .get_image_data(0.0, 0.0, width as f64, height as f64)
        .map_err(|e| anyhow::anyhow!("{:?}", e))?;
    Ok(ImagePixels {
        width,
        height,
        data: data.data().0,
    })
}

pub fn upload_rgba(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    label: &str,
    pixels: &ImagePixels,
) -> wgpu::TextureView {
    let (tex, view) = create_color_texture_device(
        device,
        label,
        pixels.width,
        pixels.height,
        wgpu::TextureFormat::Rgba8UnormSrgb,
        wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
    );
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &tex,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        &pixels.data,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * pixels.width),
            rows_per_image: Some(pixels.height),
        },
        wgpu::Extent3d {
            width: pixels.width,
            height: pixels.height,
            depth_or_array_layers: 1,
        },
    );
    view
}
