use super::Collection;
use crate::cross_section::CrossSection;
use crate::footprint::Rect;

/// Drawing target that remembers which collections were added and which part of
/// the (station, elevation) plane is visible.
///
/// Limits set by the user are never replaced by [`autoscale`](Axes::autoscale).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Axes {
    limits: Option<Rect>,
    user_set: bool,
    collections: Vec<Collection>,
}

impl Axes {
    pub fn new() -> Self {
        Self::default()
    }

    /// axes with explicit limits
    pub fn with_limits(limits: Rect) -> Self {
        let mut axes = Self::new();
        axes.set_limits(limits);
        axes
    }

    pub fn set_limits(&mut self, limits: Rect) {
        self.limits = Some(limits);
        self.user_set = true;
    }

    pub fn limits(&self) -> Option<Rect> {
        self.limits
    }

    pub fn has_user_limits(&self) -> bool {
        self.user_set
    }

    /// use the data extent as limits, unless the user chose limits already
    pub fn autoscale(&mut self, extent: Option<Rect>) {
        if self.user_set {
            return;
        }

        if let Some(extent) = extent {
            self.limits = Some(match self.limits {
                Some(current) => current.union(&extent),
                None => extent,
            });
        }
    }

    pub fn add_collection(&mut self, collection: Collection) {
        self.collections.push(collection);
    }

    /// add a collection drawn from `xsect` and rescale to the cross-section
    pub fn draw(&mut self, xsect: &CrossSection<'_>, collection: Collection) {
        self.add_collection(collection);
        self.autoscale(xsect.extent());
    }

    pub fn collections(&self) -> &[Collection] {
        &self.collections
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points() -> Collection {
        Collection::Points {
            label: "centers".into(),
            points: vec![[0.5, 0.5]],
        }
    }

    #[test]
    fn user_limits_are_kept() {
        let limits = Rect::new(0.0, 500.0, 0.0, 25.0);
        let mut axes = Axes::with_limits(limits);
        axes.add_collection(points());
        axes.autoscale(Some(Rect::new(0.0, 1000.0, 0.0, 100.0)));
        assert_eq!(axes.limits(), Some(limits));
    }

    #[test]
    fn autoscale_grows_with_data() {
        let mut axes = Axes::new();
        axes.autoscale(None);
        assert_eq!(axes.limits(), None);

        axes.autoscale(Some(Rect::new(0.0, 10.0, -5.0, 0.0)));
        assert_eq!(axes.limits(), Some(Rect::new(0.0, 10.0, -5.0, 0.0)));

        axes.autoscale(Some(Rect::new(5.0, 20.0, -2.0, 1.0)));
        assert_eq!(axes.limits(), Some(Rect::new(0.0, 20.0, -5.0, 1.0)));
        assert!(!axes.has_user_limits());
    }
}
