//! Methods and type constants, and the single-owner container logic that
//! moves them between types.

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DependError, Result};
use crate::ident::{new_uuid, MemberId, TypeId};
use crate::model::CodeModel;
use crate::types::Modifiers;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberKind {
    Method,
    Constant,
}

/// A method or constant. Owned by at most one type at a time.
#[derive(Debug, Clone)]
pub struct Member {
    pub(crate) id: MemberId,
    pub(crate) uuid: Uuid,
    pub(crate) name: String,
    pub(crate) kind: MemberKind,
    pub(crate) modifiers: Modifiers,
    /// Literal source text of a constant's value.
    pub(crate) value: Option<String>,
    pub(crate) owner: Option<TypeId>,
}

impl Member {
    pub(crate) fn new(id: MemberId, name: String, kind: MemberKind) -> Self {
        Self {
            id,
            uuid: new_uuid(),
            name,
            kind,
            modifiers: Modifiers::NONE,
            value: None,
            owner: None,
        }
    }

    pub fn id(&self) -> MemberId {
        self.id
    }

    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> MemberKind {
        self.kind
    }

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// The type whose member list currently holds this member.
    pub fn owner(&self) -> Option<TypeId> {
        self.owner
    }
}

impl CodeModel {
    /// Attach `member` to `owner`.
    ///
    /// A member that already belongs to another type is first removed from
    /// it, every occurrence included. The member is appended without a
    /// duplicate check, so attaching it twice to the same type lists it twice.
    pub fn add_member(&mut self, owner: TypeId, member: MemberId) -> Result<MemberId> {
        self.type_node(owner)?;
        let (kind, previous) = {
            let m = self.member_node(member)?;
            (m.kind, m.owner)
        };

        if let Some(previous) = previous.filter(|&p| p != owner) {
            debug!(%member, from = %previous, to = %owner, "transferring member ownership");
            let node = self.type_mut(previous)?;
            node.methods.retain(|&m| m != member);
            node.constants.retain(|&m| m != member);
        }

        self.member_mut(member)?.owner = Some(owner);
        let node = self.type_mut(owner)?;
        match kind {
            MemberKind::Method => node.methods.push(member),
            MemberKind::Constant => node.constants.push(member),
        }
        Ok(member)
    }

    /// Detach `member` from `owner`. A member that `owner` does not hold is
    /// left untouched.
    pub fn remove_member(&mut self, owner: TypeId, member: MemberId) -> Result<()> {
        let kind = self.member_node(member)?.kind;
        let node = self.type_mut(owner)?;
        let list = match kind {
            MemberKind::Method => &mut node.methods,
            MemberKind::Constant => &mut node.constants,
        };
        let Some(pos) = list.iter().position(|&m| m == member) else {
            return Ok(());
        };
        list.remove(pos);
        let still_listed = list.contains(&member);
        if !still_listed {
            self.member_mut(member)?.owner = None;
        }
        Ok(())
    }

    pub fn add_method(&mut self, owner: TypeId, method: MemberId) -> Result<MemberId> {
        self.expect_member_kind(method, MemberKind::Method)?;
        self.add_member(owner, method)
    }

    pub fn remove_method(&mut self, owner: TypeId, method: MemberId) -> Result<()> {
        self.expect_member_kind(method, MemberKind::Method)?;
        self.remove_member(owner, method)
    }

    pub fn add_constant(&mut self, owner: TypeId, constant: MemberId) -> Result<MemberId> {
        self.expect_member_kind(constant, MemberKind::Constant)?;
        self.add_member(owner, constant)
    }

    pub fn remove_constant(&mut self, owner: TypeId, constant: MemberId) -> Result<()> {
        self.expect_member_kind(constant, MemberKind::Constant)?;
        self.remove_member(owner, constant)
    }

    /// Methods of a type in insertion order.
    pub fn methods(&self, ty: TypeId) -> impl Iterator<Item = &Member> + '_ {
        self.member_list(ty, MemberKind::Method)
    }

    /// Constants of a type in insertion order.
    pub fn constants(&self, ty: TypeId) -> impl Iterator<Item = &Member> + '_ {
        self.member_list(ty, MemberKind::Constant)
    }

    /// Methods followed by constants.
    pub fn members(&self, ty: TypeId) -> impl Iterator<Item = &Member> + '_ {
        self.methods(ty).chain(self.constants(ty))
    }

    fn member_list(&self, ty: TypeId, kind: MemberKind) -> impl Iterator<Item = &Member> + '_ {
        let ids: &[MemberId] = match (self.get_type(ty), kind) {
            (Some(node), MemberKind::Method) => &node.methods,
            (Some(node), MemberKind::Constant) => &node.constants,
            (None, _) => &[],
        };
        ids
            .iter()
            .filter_map(move |&id| self.get_member(id))
    }

    fn expect_member_kind(&self, member: MemberId, kind: MemberKind) -> Result<()> {
        let actual = self.member_node(member)?.kind;
        if actual != kind {
            return Err(DependError::invalid(format!(
                "{member} is a {actual:?}, expected a {kind:?}"
            )));
        }
        Ok(())
    }
}
