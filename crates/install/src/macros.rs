//! Macros for options builder helpers

/// Generate `new()`, `Default` and one `with_<field>` setter per field for a
/// plain options struct whose fields all implement `Default`.
#[macro_export]
macro_rules! options_builder {
    ($name:ident { $($field:ident: $ty:ty),* $(,)? }) => {
        paste::paste! {
            impl $name {
                /// Create options with default values
                #[must_use]
                pub fn new() -> Self {
                    Self {
                        $($field: Default::default(),)*
                    }
                }

                $( #[must_use]
                pub fn [<with_ $field>](mut self, value: $ty) -> Self {
                    self.$field = value;
                    self
                } )*
            }

            impl Default for $name {
                fn default() -> Self {
                    Self::new()
                }
            }
        }
    };
}
