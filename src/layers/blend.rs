use crate::foundation::core::{ALPHA_MAP_TEXELS, FULL_OPACITY, MAX_LAYERS};
use crate::foundation::math::{round_to_u8, transmittance};
use crate::layers::set::LayerSet;

/// How stored opacity values relate to what is visible.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlphaEncoding {
    /// Each stored value is the layer's visible contribution.
    #[default]
    Independent,
    /// Each stored value is the opacity over the layers below it; layers above attenuate it.
    Cascading,
}

/// Visible contributions of stacked cascading values, in place.
///
/// `values[0]` is the lowest stored layer. Layer `k` keeps `values[k] * Π (255 - values[m]) / 255`
/// over every layer `m` above it.
pub(crate) fn cascading_to_independent(values: &mut [f32]) {
    for k in 0..values.len() {
        let t = transmittance(&values[k + 1..]);
        values[k] *= t;
    }
}

/// Cascading values that reproduce the visible contributions in `values`, in place.
///
/// Solved from the top layer down. A layer below a fully opaque one is invisible and stored as 0.
pub(crate) fn independent_to_cascading(values: &mut [f32]) {
    let full = f32::from(FULL_OPACITY);
    for k in (0..values.len()).rev() {
        let mut v = values[k];
        for m in (k + 1..values.len()).rev() {
            if values[m] >= full {
                v = 0.0;
                break;
            }
            v = v / (full - values[m]) * full;
        }
        values[k] = v.min(full);
    }
}

/// Round `values` and take any excess over 255 off the largest channels, never `keep`.
///
/// Falls back to `keep` itself when it is the only channel with coverage left.
pub(crate) fn clamp_to_full_coverage(values: &[f32], keep: Option<usize>) -> [u8; MAX_LAYERS - 1] {
    let mut out = [0u8; MAX_LAYERS - 1];
    for (o, &v) in out.iter_mut().zip(values) {
        *o = round_to_u8(v);
    }
    let n = values.len().min(out.len());
    let mut total: u16 = out[..n].iter().map(|&v| u16::from(v)).sum();
    while total > u16::from(FULL_OPACITY) {
        let victim = (0..n)
            .filter(|&k| Some(k) != keep && out[k] > 0)
            .max_by_key(|&k| out[k])
            .or(keep.filter(|&k| k < n && out[k] > 0));
        let Some(k) = victim else { break };
        out[k] -= 1;
        total -= 1;
    }
    out
}

impl<T> LayerSet<T> {
    /// Current encoding of the stored opacity maps.
    pub fn alpha_encoding(&self) -> AlphaEncoding {
        self.encoding
    }

    /// Visible weight of every slot at `texel`, base included. Absent slots weigh 0.
    pub(crate) fn texel_weights(&self, texel: usize) -> [f32; MAX_LAYERS] {
        let n = self.slots.len();
        let mut w = [0.0f32; MAX_LAYERS];
        if n == 0 {
            return w;
        }
        let stored = self.stored_alphas(texel);
        let mut upper = [0.0f32; MAX_LAYERS - 1];
        for (u, &s) in upper.iter_mut().zip(&stored) {
            *u = f32::from(s);
        }
        let upper = &mut upper[..n - 1];
        if self.encoding == AlphaEncoding::Cascading {
            cascading_to_independent(upper);
        }
        w[1..n].copy_from_slice(upper);
        w[0] = (f32::from(FULL_OPACITY) - upper.iter().sum::<f32>()).max(0.0);
        w
    }

    /// Rounded visible weight of every slot at `texel`; sums to 255 for a non-empty set.
    pub fn layer_weights(&self, texel: usize) -> [u8; MAX_LAYERS] {
        let mut out = [0u8; MAX_LAYERS];
        if self.slots.is_empty() || texel >= ALPHA_MAP_TEXELS {
            return out;
        }
        let w = self.texel_weights(texel);
        let n = self.slots.len();
        let upper = clamp_to_full_coverage(&w[1..n], None);
        out[1..n].copy_from_slice(&upper[..n - 1]);
        let others: u16 = upper.iter().map(|&v| u16::from(v)).sum();
        out[0] = u16::from(FULL_OPACITY).saturating_sub(others) as u8;
        out
    }

    /// Store visible weights for every slot at `texel` in the current encoding.
    ///
    /// `weights[0]` (the base layer) is implied by the others and ignored.
    pub(crate) fn store_weights(&mut self, texel: usize, weights: &[f32; MAX_LAYERS]) {
        let n = self.slots.len();
        if n < 2 {
            return;
        }
        let mut upper = [0.0f32; MAX_LAYERS - 1];
        upper[..n - 1].copy_from_slice(&weights[1..n]);
        let values = match self.encoding {
            AlphaEncoding::Independent => clamp_to_full_coverage(&upper[..n - 1], None),
            AlphaEncoding::Cascading => {
                independent_to_cascading(&mut upper[..n - 1]);
                clamp_each(&upper[..n - 1])
            }
        };
        for (slot, &v) in self.slots.iter_mut().skip(1).zip(&values) {
            if let Some(map) = slot.alpha.as_mut() {
                map.set(texel, v);
            }
        }
    }

    /// Fold layer `drop` into layer `keep` and erase `drop`.
    ///
    /// Visible coverage is conserved at every texel. The merge reads and writes weights in the
    /// set's current encoding, so cascading sets stay cascading. Out-of-range or equal indices
    /// are ignored.
    pub fn merge_layers(&mut self, keep: usize, drop: usize) -> bool {
        let n = self.slots.len();
        if keep >= n || drop >= n || keep == drop {
            return false;
        }

        let mut merged = vec![[0.0f32; MAX_LAYERS]; ALPHA_MAP_TEXELS];
        for (texel, out) in merged.iter_mut().enumerate() {
            let mut w = self.texel_weights(texel);
            w[keep] += w[drop];
            w.copy_within(drop + 1.., drop);
            w[MAX_LAYERS - 1] = 0.0;
            *out = w;
        }

        self.remove_slot(drop);
        for (texel, w) in merged.iter().enumerate() {
            self.store_weights(texel, w);
        }
        self.regenerate_display();
        tracing::debug!(keep, drop, layers = self.slots.len(), "merged texture layers");
        true
    }

    /// Re-encode cascading maps so every stored value is the layer's visible contribution.
    #[tracing::instrument(skip(self), fields(layers = self.slots.len()))]
    pub fn to_independent_alpha(&mut self) -> bool {
        if self.encoding == AlphaEncoding::Independent {
            return false;
        }
        let n = self.slots.len();
        if n > 1 {
            for texel in 0..ALPHA_MAP_TEXELS {
                let w = self.texel_weights(texel);
                let values = clamp_to_full_coverage(&w[1..n], None);
                self.write_stored(texel, &values);
            }
        }
        self.encoding = AlphaEncoding::Independent;
        self.regenerate_display();
        true
    }

    /// Re-encode independent maps into the stacked cascading form.
    #[tracing::instrument(skip(self), fields(layers = self.slots.len()))]
    pub fn to_cascading_alpha(&mut self) -> bool {
        if self.encoding == AlphaEncoding::Cascading {
            return false;
        }
        let n = self.slots.len();
        if n > 1 {
            for texel in 0..ALPHA_MAP_TEXELS {
                let mut upper = [0.0f32; MAX_LAYERS - 1];
                for (u, &s) in upper.iter_mut().zip(&self.stored_alphas(texel)) {
                    *u = f32::from(s);
                }
                independent_to_cascading(&mut upper[..n - 1]);
                let values = clamp_each(&upper[..n - 1]);
                self.write_stored(texel, &values);
            }
        }
        self.encoding = AlphaEncoding::Cascading;
        self.regenerate_display();
        true
    }

    /// Switch to independent encoding before editing.
    pub(crate) fn ensure_independent(&mut self) {
        if self.encoding == AlphaEncoding::Cascading {
            self.to_independent_alpha();
        }
    }

    fn write_stored(&mut self, texel: usize, values: &[u8; MAX_LAYERS - 1]) {
        for (slot, &v) in self.slots.iter_mut().skip(1).zip(values) {
            if let Some(map) = slot.alpha.as_mut() {
                map.set(texel, v);
            }
        }
    }
}

fn clamp_each(values: &[f32]) -> [u8; MAX_LAYERS - 1] {
    let mut out = [0u8; MAX_LAYERS - 1];
    for (o, &v) in out.iter_mut().zip(values) {
        *o = round_to_u8(v);
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/layers/blend.rs"]
mod tests;
