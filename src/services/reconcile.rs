// src/services/reconcile.rs
//
// As três formas de aplicar no estado local uma linha confirmada pelo servidor.

use crate::models::Record;

/// Coloca a linha confirmada no início. A ordem "mais novo primeiro" faz parte do contrato.
pub fn insert_front<T>(items: &mut Vec<T>, confirmed: T) {
    items.insert(0, confirmed);
}

/// Substitui no lugar a linha com o mesmo id. Devolve `false` se ela não estava na coleção.
pub fn replace_by_id<T: Record>(items: &mut [T], confirmed: T) -> bool {
    match items.iter_mut().find(|item| item.id() == confirmed.id()) {
        Some(slot) => {
            *slot = confirmed;
            true
        }
        None => false,
    }
}

/// Uma única passada aplicando `patch` em tudo que casa com `matches`.
pub fn bulk_patch<T, P, F>(items: &mut [T], matches: P, mut patch: F) -> usize
where
    P: Fn(&T) -> bool,
    F: FnMut(&mut T),
{
    let mut patched = 0;
    for item in items.iter_mut().filter(|item| matches(&**item)) {
        patch(item);
        patched += 1;
    }
    patched
}
