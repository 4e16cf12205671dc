//! Repository setup.

use anyhow::Result;
use subkit_core::subspace::{init_subspaces, list_subspaces};
use subkit_core::RepoContext;

use crate::formatting::{
    print_info, print_key_value, print_section_header, print_success, SectionStyle,
};

pub fn cmd_init(ctx: &RepoContext) -> Result<()> {
    if init_subspaces(ctx)? {
        print_section_header("Subspaces", SectionStyle::Success);
        print_success("Subspaces enabled");
    } else {
        print_section_header("Subspaces", SectionStyle::Primary);
        print_info("Subspaces were already enabled");
    }
    print_key_value("Subspaces", &list_subspaces(ctx)?.join(", "));
    println!();

    Ok(())
}
