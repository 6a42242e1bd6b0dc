/// Accessor for one field of [`crate::global_state::Globals`].
/// Usage: `global_signal!(pub fn_name, field: Type);`
#[macro_export]
macro_rules! global_signal {
    ($vis:vis $name:ident, $field:ident : $ty:ty) => {
        $vis fn $name() -> ::leptos::RwSignal<$ty> {
            $crate::global_state::globals().$field
        }
    };
}

/// Several accessors at once.
///
/// Usage:
/// `global_signals! {
///     pub snapshot_fn => snapshot: Option<ManagerSnapshot>,
///     templates_fn => templates: Vec<StyleTemplate>,
/// }`
#[macro_export]
macro_rules! global_signals {
    ( $( $vis:vis $name:ident => $field:ident : $ty:ty ),+ $(,)? ) => {
        $(
            $vis fn $name() -> ::leptos::RwSignal<$ty> {
                $crate::global_state::globals().$field
            }
        )+
    };
}
