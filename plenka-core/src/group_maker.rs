use plenka_state::{Photo, PhotoGroup};

/// Incrementally merges nearby single photos into [`PhotoGroup`]s.
///
/// Photos handed to [`GroupMaker::add_data`] stay here between calls, either
/// as singles or as group members, so later photos can join earlier ones.
#[derive(Debug, Default)]
pub struct GroupMaker {
    singles: Vec<Photo>,
    groups: Vec<PhotoGroup>,
    group_diameter: f64,
}
impl GroupMaker {
    pub fn new(group_diameter: f64) -> Self {
        Self {
            group_diameter,
            ..Default::default()
        }
    }

    pub fn group_diameter(&self) -> f64 {
        self.group_diameter
    }

    pub fn singles(&self) -> &[Photo] {
        &self.singles
    }

    pub fn groups(&self) -> &[PhotoGroup] {
        &self.groups
    }

    /// Adds photos and regroups everything held, optionally with a new
    /// diameter. Returns the photos left ungrouped and all groups.
    pub fn add_data(
        &mut self,
        new_group_diameter: Option<f64>,
        photos: impl IntoIterator<Item = Photo>,
    ) -> (&[Photo], &[PhotoGroup]) {
        if let Some(diameter) = new_group_diameter {
            self.group_diameter = diameter;
        }
        self.singles.extend(photos);

        // Evict with the new diameter before anything is absorbed.
        self.evict_distant_members();
        self.fill_existing_groups();
        self.make_new_groups();

        (&self.singles, &self.groups)
    }

    /// Drops every photo and group, optionally with a new diameter.
    pub fn clear(&mut self, new_group_diameter: Option<f64>) {
        if let Some(diameter) = new_group_diameter {
            self.group_diameter = diameter;
        }
        self.singles.clear();
        self.groups.clear();
    }

    fn evict_distant_members(&mut self) {
        let diameter = self.group_diameter;
        for group in &mut self.groups {
            self.singles.extend(group.take_photos_beyond(diameter));
        }
        self.groups.retain(|group| !group.is_empty());
    }

    fn fill_existing_groups(&mut self) {
        let diameter = self.group_diameter;
        for group in &mut self.groups {
            let (joining, staying): (Vec<Photo>, Vec<Photo>) = std::mem::take(&mut self.singles)
                .into_iter()
                .partition(|photo| group.accepts(&photo.coordinate, diameter));
            self.singles = staying;
            for photo in joining {
                group.push(photo);
            }
        }
    }

    fn make_new_groups(&mut self) {
        let diameter = self.group_diameter;
        let mut index = 0;
        while index < self.singles.len() {
            let mut group = PhotoGroup::new(self.singles[index].coordinate);

            let mut other = index + 1;
            while other < self.singles.len() {
                if group.accepts(&self.singles[other].coordinate, diameter) {
                    group.push(self.singles.remove(other));
                } else {
                    other += 1;
                }
            }

            if group.is_empty() {
                index += 1;
                continue;
            }

            group.push(self.singles.remove(index));
            self.groups.push(group);
        }
    }
}
