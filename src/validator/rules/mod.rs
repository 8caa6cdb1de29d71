mod about_not_iri;
mod meta_name_misuse;
mod opengraph_namespace;

pub use about_not_iri::{AboutNotIriRule, INVALID_ABOUT_NODES};
pub use meta_name_misuse::{ERRORED_META_NODES, MetaNameMisuseFix, MetaNameMisuseRule};
pub use opengraph_namespace::{
    MissingOpenGraphNamespaceFix, MissingOpenGraphNamespaceRule, OPENGRAPH_ROOT,
};
