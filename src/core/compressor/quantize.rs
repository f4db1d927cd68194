//! Palette construction for PNG quantization.
//!
//! Images that already fit in the palette keep their exact colours.
//! Anything larger is reduced with NeuQuant from `color_quant`.

use color_quant::NeuQuant;
use std::collections::HashMap;

/// Fraction of pixels sampled while training (1 = every pixel, 30 = fastest)
const SAMPLE_FACTOR: i32 = 10;

/// Opaque alpha fed to the network so only colour drives training
const OPAQUE: u8 = 255;

enum Lookup {
    Exact(HashMap<[u8; 3], u8>),
    Trained(NeuQuant),
}

/// A palette of at most 256 RGB colours plus the lookup that maps onto it
pub struct Palette {
    colors: Vec<[u8; 3]>,
    lookup: Lookup,
}

impl Palette {
    /// Build a palette of at most `max_colors` entries (clamped to 1..=256)
    pub fn build<I>(pixels: I, max_colors: usize) -> Self
    where
        I: IntoIterator<Item = [u8; 3]>,
    {
        let max_colors = max_colors.clamp(1, 256);

        let mut exact: HashMap<[u8; 3], u8> = HashMap::new();
        let mut colors: Vec<[u8; 3]> = Vec::new();
        let mut samples: Vec<u8> = Vec::new();
        let mut overflowed = false;

        for rgb in pixels {
            if !overflowed && !exact.contains_key(&rgb) {
                if colors.len() == max_colors {
                    overflowed = true;
                } else {
                    exact.insert(rgb, colors.len() as u8);
                    colors.push(rgb);
                }
            }
            samples.extend_from_slice(&[rgb[0], rgb[1], rgb[2], OPAQUE]);
        }

        if colors.is_empty() {
            colors.push([0, 0, 0]);
            exact.insert([0, 0, 0], 0);
        }
        if !overflowed {
            return Self {
                colors,
                lookup: Lookup::Exact(exact),
            };
        }

        let network = NeuQuant::new(SAMPLE_FACTOR, max_colors, &samples);
        let colors = network
            .color_map_rgb()
            .chunks_exact(3)
            .map(|c| [c[0], c[1], c[2]])
            .collect();
        Self {
            colors,
            lookup: Lookup::Trained(network),
        }
    }

    pub fn colors(&self) -> &[[u8; 3]] {
        &self.colors
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Palette index closest to `rgb`
    pub fn index_of(&self, rgb: [u8; 3]) -> u8 {
        match &self.lookup {
            Lookup::Exact(table) => match table.get(&rgb) {
                Some(&index) => index,
                None => self.nearest(rgb),
            },
            Lookup::Trained(network) => network.index_of(&[rgb[0], rgb[1], rgb[2], OPAQUE]) as u8,
        }
    }

    /// Palette colour closest to `rgb`
    pub fn map(&self, rgb: [u8; 3]) -> [u8; 3] {
        self.colors[self.index_of(rgb) as usize]
    }

    /// Flattened RGB triples for a PLTE chunk
    pub fn to_plte(&self) -> Vec<u8> {
        self.colors.iter().flatten().copied().collect()
    }

    fn nearest(&self, rgb: [u8; 3]) -> u8 {
        let distance = |c: &[u8; 3]| {
            c.iter()
                .zip(rgb.iter())
                .map(|(&a, &b)| (a as i32 - b as i32).pow(2))
                .sum::<i32>()
        };
        self.colors
            .iter()
            .enumerate()
            .min_by_key(|(_, c)| distance(c))
            .map_or(0, |(i, _)| i as u8)
    }
}
