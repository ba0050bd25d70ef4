use error_stack::{Context, Report};

// figment's error type buries the interesting parts (offending key,
// source file or env var) inside metadata; pull them out as printable
// attachments so a bad config is diagnosable from the log alone.
pub trait FigmentErrorAttachable<T: Context> {
    fn attach_figment_error(self, err: figment::Error) -> Report<T>;
}

impl<T: Context> FigmentErrorAttachable<T> for Report<T> {
    fn attach_figment_error(self, err: figment::Error) -> Report<T> {
        let mut this = self.attach_printable(err.kind.to_string());

        if let (Some(profile), Some(metadata)) = (&err.profile, &err.metadata) {
            if !err.path.is_empty() {
                let key = metadata.interpolate(profile, &err.path);
                this = this.attach_printable(format!("for key {key:?}"));
            }
        }

        if let Some(metadata) = &err.metadata {
            this = match &metadata.source {
                Some(source) => this.attach_printable(format!("in {source} {}", metadata.name)),
                None => this.attach_printable(format!("in {}", metadata.name)),
            };
        }

        this
    }
}
