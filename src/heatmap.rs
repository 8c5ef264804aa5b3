use crate::config::EngineConfig;
use crate::error::Error;
use crate::math;

use nalgebra as na;
use ndarray::prelude::*;
use opencv::{
    core::{self, Mat, Scalar},
    imgproc,
    prelude::*,
};
use serde_derive::{Deserialize, Serialize};

/// Shape of the intensity added around a centroid.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Splash {
    /// Every cell inside the radius gets the full increment.
    #[default]
    Flat,
    /// Cells inside the radius get the increment scaled by a Gaussian of
    /// their distance to the centroid.
    Gaussian { sigma: f32 },
}

/// How accumulated intensity is mapped to `0..=255` when rendering.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Normalization {
    /// Stretch the current field minimum..maximum over the full range. The
    /// same absolute intensity renders cooler as the maximum grows.
    #[default]
    MinMax,
    /// Scale against a fixed ceiling, intensities above it saturate.
    Fixed { ceiling: f32 },
}

/// Per-pixel density field over the frame plane.
#[derive(Debug, Clone)]
pub struct Heatmap {
    field: Array2<f32>,
    radius: f32,
    increment: f32,
    splash: Splash,
    decay: f32,
    normalization: Normalization,
    frame_weight: f32,
}

impl Heatmap {
    /// Field of `width` x `height` with the default deposit and render
    /// settings.
    pub fn new(width: usize, height: usize) -> Self {
        Self::from_config(&EngineConfig::new(width, height))
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            field: Array2::zeros((config.height, config.width)),
            radius: config.heat_radius,
            increment: config.heat_increment,
            splash: config.splash,
            decay: config.heat_decay,
            normalization: config.normalization,
            frame_weight: config.frame_weight,
        }
    }

    /// Accumulated intensity, indexed `[[y, x]]`.
    #[inline]
    pub fn field(&self) -> ArrayView2<'_, f32> {
        self.field.view()
    }

    pub fn max_intensity(&self) -> f32 {
        self.field.fold(0.0f32, |acc, &v| acc.max(v))
    }

    /// Adds heat to every cell within the radius of `centroid`.
    ///
    /// A centroid that is not finite or lies outside the grid leaves the
    /// field untouched; disc cells past the grid edge are clipped. Returns
    /// whether anything was deposited.
    pub fn deposit(&mut self, centroid: na::Point2<f32>) -> bool {
        let (h, w) = self.field.dim();
        let (cx, cy) = (centroid.x, centroid.y);

        if !(cx.is_finite() && cy.is_finite())
            || cx < 0.0
            || cy < 0.0
            || cx >= w as f32
            || cy >= h as f32
        {
            log::trace!("deposit at ({}, {}) outside {}x{} grid", cx, cy, w, h);
            return false;
        }

        let r = self.radius;
        let r2 = r * r;

        let x0 = (cx - r).ceil().max(0.0) as usize;
        let y0 = (cy - r).ceil().max(0.0) as usize;
        let x1 = ((cx + r).floor() as usize).min(w - 1);
        let y1 = ((cy + r).floor() as usize).min(h - 1);

        for y in y0..=y1 {
            let dy = y as f32 - cy;

            for x in x0..=x1 {
                let dx = x as f32 - cx;
                let d2 = dx * dx + dy * dy;

                if d2 > r2 {
                    continue;
                }

                let amount = match self.splash {
                    Splash::Flat => self.increment,
                    Splash::Gaussian { sigma } => self.increment * math::gauss(d2.sqrt(), sigma),
                };

                self.field[[y, x]] += amount;
            }
        }

        true
    }

    /// Fades the whole field by the configured decay factor.
    pub fn decay(&mut self) {
        if self.decay < 1.0 {
            let k = self.decay;
            self.field.mapv_inplace(|v| v * k);
        }
    }

    pub fn reset(&mut self) {
        self.field.fill(0.0);
    }

    /// Field as a single-channel `CV_32F` matrix.
    fn field_mat(&self) -> Result<Mat, Error> {
        let (h, w) = self.field.dim();
        let mut mat =
            Mat::new_rows_cols_with_default(h as i32, w as i32, core::CV_32FC1, Scalar::all(0.0))?;

        for (dst, &src) in mat.data_typed_mut::<f32>()?.iter_mut().zip(self.field.iter()) {
            *dst = src;
        }

        Ok(mat)
    }

    /// Intensity scaled to `0..=255` as a `CV_8UC1` matrix. Fractions are
    /// truncated, not rounded.
    fn intensity_mat(&self) -> Result<Mat, Error> {
        let field = self.field_mat()?;
        let mut scaled = Mat::default();

        match self.normalization {
            Normalization::MinMax => core::normalize(
                &field,
                &mut scaled,
                0.0,
                255.0,
                core::NORM_MINMAX,
                core::CV_32F,
                &Mat::default(),
            )?,
            Normalization::Fixed { ceiling } => {
                field.convert_to(&mut scaled, core::CV_32F, 255.0 / ceiling as f64, 0.0)?
            }
        }

        let mut heat = Mat::new_rows_cols_with_default(
            field.rows(),
            field.cols(),
            core::CV_8UC1,
            Scalar::all(0.0),
        )?;

        // float to int `as` truncates and saturates, NaN becomes 0
        for (dst, &src) in heat.data_bytes_mut()?.iter_mut().zip(scaled.data_typed::<f32>()?) {
            *dst = src as u8;
        }

        Ok(heat)
    }

    /// Field mapped to `0..=255` with the configured normalization.
    pub fn normalized(&self) -> Result<Array2<u8>, Error> {
        let heat = self.intensity_mat()?;

        Ok(Array2::from_shape_vec(self.field.dim(), heat.data_bytes()?.to_vec())?)
    }

    /// Blends the JET-coloured field over `frame`, an RGB image of shape
    /// `(height, width, 3)`. Neither the frame nor the field is modified.
    pub fn render_overlay(&self, frame: ArrayView3<'_, u8>) -> Result<Array3<u8>, Error> {
        let (h, w) = self.field.dim();

        if frame.dim() != (h, w, 3) {
            return Err(Error::FrameShape {
                expected: (h, w, 3),
                actual: frame.dim(),
            });
        }

        let heat = self.intensity_mat()?;

        let mut jet = Mat::default();
        imgproc::apply_color_map(&heat, &mut jet, imgproc::COLORMAP_JET)?;

        let mut heat_rgb = Mat::default();
        imgproc::cvt_color(&jet, &mut heat_rgb, imgproc::COLOR_BGR2RGB, 0)?;

        let mut base =
            Mat::new_rows_cols_with_default(h as i32, w as i32, core::CV_8UC3, Scalar::all(0.0))?;

        for (dst, &src) in base.data_bytes_mut()?.iter_mut().zip(frame.iter()) {
            *dst = src;
        }

        let alpha = self.frame_weight as f64;
        let mut blended = Mat::default();
        core::add_weighted(&base, alpha, &heat_rgb, 1.0 - alpha, 0.0, &mut blended, -1)?;

        Ok(Array3::from_shape_vec((h, w, 3), blended.data_bytes()?.to_vec())?)
    }
}
