use std::mem::take;
use std::ops::{Deref, DerefMut};
use std::ptr::NonNull;

use context::Transfer;

/// Container technically quite similar to Option but with the special purpose to hold a value that can be moved out exactly once.
/// It moves data between two callstacks: the sender writes into a container owned by the receiver before execution control is switched,
/// and the receiver moves the value out after it is resumed, leaving the container at the "swap place" empty again.
pub(crate) enum ValueExchangeContainer<V> {
    Value(V),
    Empty,
}

impl<V> From<V> for ValueExchangeContainer<V> {
    fn from(v: V) -> Self {
        ValueExchangeContainer::prepare_exchange(v)
    }
}

impl<V> Default for ValueExchangeContainer<V> {
    /// Needed to use std::mem::take
    fn default() -> Self {
        Self::Empty
    }
}

impl<V> ValueExchangeContainer<V> {
    /// Wrap a value V in a ValueExchangeContainer
    pub fn prepare_exchange(val: V) -> Self {
        Self::Value(val)
    }

    pub fn has_content(&self) -> bool {
        match self {
            Self::Value(_) => true,
            Self::Empty => false,
        }
    }

    /// Move value out of container by returning the value and changing containers value to variant empty
    /// Panics if container is already empty
    pub fn receive_content(&mut self) -> V {
        match take(self) {
            Self::Value(v) => v,
            Self::Empty => panic!("No content to receive"),
        }
    }

    /// Encodes a reference to this container as usize, the only payload a context switch carries
    pub fn make_pointer(&mut self) -> usize {
        self as *mut Self as usize
    }

    /// Reconstructs a mutable reference to a container from a usize pointer
    ///
    /// The pointer must come from `make_pointer` on a container that is still alive
    /// and not borrowed elsewhere for the returned lifetime.
    pub unsafe fn of_pointer<'a>(p: usize) -> &'a mut Self {
        &mut *(p as *mut Self)
    }
}

/// Holder for values that are consumed and replaced by a single operation,
/// such as a context transfer which is moved into `resume` and handed back.
struct SelfUpdating<T>(Option<T>);

impl<T> SelfUpdating<T> {
    fn of(initial: T) -> Self {
        Self(Some(initial))
    }

    fn update<F: FnOnce(T) -> T>(&mut self, op: F) {
        let current = self.0.take().expect("SelfUpdating value missing during update");
        self.0 = Some(op(current))
    }
}

impl<T> From<T> for SelfUpdating<T> {
    fn from(r: T) -> Self {
        SelfUpdating::of(r)
    }
}

impl<T> Deref for SelfUpdating<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref().expect("SelfUpdating value missing")
    }
}

impl<T> DerefMut for SelfUpdating<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.0.as_mut().expect("SelfUpdating value missing")
    }
}

/// Wraps the context libs raw transfer type, which only exchanges a pointer, adding the possibility to move typed values between callstacks.
/// Therefore it has two additional attributes:
/// - a ValueExchangeContainer in which the opposite context moves input values of type Receive
/// - an optional pointer to the receiving container of the ExchangingTransfer in the opposite context, into which output values are moved
///
/// The interface only offers complete control cycles (maybe send data -> switch context and wait for resume -> read received data).
pub(crate) struct ExchangingTransfer<Send, Receive> {
    pointer_transfer: SelfUpdating<Transfer>,
    receive_container: ValueExchangeContainer<Receive>,
    send_ref: Option<NonNull<ValueExchangeContainer<Send>>>,
}

impl<Send, Receive> ExchangingTransfer<Send, Receive> {
    /// Creates an ExchangingTransfer out of a raw transfer whose pointer does not belong to an opposite receive container.
    /// No output can be sent before the first `suspend`, since the destination is unknown.
    pub fn create_without_send(pointer_transfer: Transfer) -> Self {
        Self {
            pointer_transfer: pointer_transfer.into(),
            receive_container: ValueExchangeContainer::default(),
            send_ref: None,
        }
    }

    /// Creates an ExchangingTransfer from a raw transfer already pointing at the opposite receive container.
    pub fn create_with_send(pointer_transfer: Transfer) -> Self {
        let send_ref = NonNull::new(pointer_transfer.data as *mut ValueExchangeContainer<Send>);
        Self {
            pointer_transfer: pointer_transfer.into(),
            receive_container: ValueExchangeContainer::default(),
            send_ref,
        }
    }

    /// Moves the value the initial transfer pointer refers to out of its container and creates an ExchangingTransfer without sending capability.
    ///
    /// The transfer data must be a pointer made by `ValueExchangeContainer::<V>::make_pointer`.
    pub unsafe fn create_receiving<V>(pointer_transfer: Transfer) -> (Self, V) {
        let receive = ValueExchangeContainer::<V>::of_pointer(pointer_transfer.data).receive_content();
        (Self::create_without_send(pointer_transfer), receive)
    }

    /// Sends [val] to the connected callcontext and resumes it expecting to never come back.
    /// A null pointer is transferred instead of the own receive container, as no input may occur ever again.
    pub fn dispose_with(&mut self, val: Send) -> ! {
        self.send(val);
        self.pointer_transfer.update(|t| unsafe { t.context.resume(0) });
        panic!("resumed after dispose")
    }

    /// Sends [val] to the connected callcontext and switches to it, expecting the current callcontext to be resumed later
    /// with the receive container filled.
    pub fn yield_with(&mut self, val: Send) -> Receive {
        self.send(val);
        self.suspend()
    }

    /// Writes [val] into the opposite receive container or panics in case it is unknown
    fn send(&mut self, val: Send) {
        let target = match self.send_ref {
            Some(target) => target,
            None => panic!("invalid exchange state for sending"),
        };
        // the opposite context is suspended, so its container is alive and not borrowed
        let container = unsafe { &mut *target.as_ptr() };
        if container.has_content() {
            panic!("tried to write to non-empty container")
        }
        *container = ValueExchangeContainer::prepare_exchange(val);
    }

    /// like [yield_with] but without sending a value
    pub fn suspend(&mut self) -> Receive {
        let receive_container_pointer = self.receive_container.make_pointer();
        self.pointer_transfer
            .update(|t| unsafe { t.context.resume(receive_container_pointer) });
        self.send_ref = NonNull::new(self.pointer_transfer.data as *mut ValueExchangeContainer<Send>);
        self.receive_container.receive_content()
    }
}
