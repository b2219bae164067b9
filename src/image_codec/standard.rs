use super::{ChannelRequest, ImageCodec};
use crate::core::RasterBuffer;
use crate::kernels::{to_luma, ExecutionPolicy};
use anyhow::{Context, Result};
use image::codecs::png::PngEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder};

/// `image` クレートによる標準コーデック
#[derive(Clone, Debug, Default)]
pub struct StandardImageCodec;

impl StandardImageCodec {
    pub fn new() -> Self {
        Self
    }

    /// デコード結果を 1/3/4 チャンネルのいずれかに揃える
    fn to_native(image: DynamicImage) -> Result<RasterBuffer> {
        let (width, height) = (image.width(), image.height());
        let (data, channels) = match image {
            DynamicImage::ImageLuma8(buf) => (buf.into_raw(), 1),
            DynamicImage::ImageRgb8(buf) => (buf.into_raw(), 3),
            DynamicImage::ImageRgba8(buf) => (buf.into_raw(), 4),
            other => match other.color().channel_count() {
                1 => (other.to_luma8().into_raw(), 1),
                3 => (other.to_rgb8().into_raw(), 3),
                _ => (other.to_rgba8().into_raw(), 4),
            },
        };

        RasterBuffer::new(data, width, height, channels).context("Decoded image has invalid layout")
    }
}

impl ImageCodec for StandardImageCodec {
    fn decode(&self, data: &[u8], request: ChannelRequest) -> Result<RasterBuffer> {
        let image = image::load_from_memory(data).context("Failed to decode image")?;
        let native = Self::to_native(image)?;
        // 輝度はフィルタと同じ式で変換する（image クレートの to_luma8 は係数が異なる）
        Ok(match request {
            ChannelRequest::Native => native,
            ChannelRequest::Luma => to_luma(&native, ExecutionPolicy::Serial),
        })
    }

    fn encode(&self, raster: &RasterBuffer) -> Result<Vec<u8>> {
        let color = match raster.channels() {
            1 => ExtendedColorType::L8,
            3 => ExtendedColorType::Rgb8,
            4 => ExtendedColorType::Rgba8,
            other => anyhow::bail!("Cannot encode {other}-channel raster"),
        };

        let mut bytes = Vec::new();
        PngEncoder::new(&mut bytes)
            .write_image(raster.data(), raster.width(), raster.height(), color)
            .context("Failed to encode PNG")?;
        Ok(bytes)
    }

}
